// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod backend;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod mailer;
pub mod models;
pub mod projection;
pub mod reminder;
pub mod utils;
