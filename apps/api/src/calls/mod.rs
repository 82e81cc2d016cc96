//! HOC call triggers: validation, the per-request pipeline and its handlers.

pub mod handlers;
pub mod pipeline;
pub mod request;
