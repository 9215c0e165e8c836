// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Interactive chat front end

pub mod repl;

pub use repl::{Repl, ReplCommand};
