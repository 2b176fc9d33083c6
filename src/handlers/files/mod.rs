// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod list_directory;
pub mod read_file;
pub mod write_file;

pub use list_directory::*;
pub use read_file::*;
pub use write_file::*;
