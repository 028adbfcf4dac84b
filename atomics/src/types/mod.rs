// Copyright 2019-2020 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod i64;
pub use self::i64::*;

mod u64;
pub use self::u64::*;

mod usize;
pub use self::usize::*;
