// Copyright 2020 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Lock-free interval sampling on top of [`hdrhistogram`]: a writer/reader
//! phaser ([`Phaser`], component F) and the active/inactive histogram pair
//! built on it ([`IntervalRecorder`], component G).

mod error;
mod interval;
mod phaser;

pub use error::Error;
pub use interval::IntervalRecorder;
pub use phaser::Phaser;
