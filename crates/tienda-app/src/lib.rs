// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod cart;
pub mod catalog;
pub mod chat;
pub mod ids;
pub mod model;
pub mod state;

pub use cart::*;
pub use catalog::*;
pub use chat::*;
pub use ids::*;
pub use model::*;
pub use state::*;
