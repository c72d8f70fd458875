/// Buy/sell/hold signals, forward-return labels and trade sizing
pub mod signal;
