// Copyright 2019-2020 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod arithmetic;
pub use arithmetic::*;

mod atomic;
pub use atomic::*;

// marker traits

/// Values are signed
pub trait Signed {}

/// Values are unsigned
pub trait Unsigned {}
