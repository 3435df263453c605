//! Use-case layer wiring the session store to the answering service.

mod exchange;

pub use exchange::{ERROR_CHIP, ExchangeCoordinator};
