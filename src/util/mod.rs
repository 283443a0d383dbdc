//! More-or-less general-purpose utilities.

pub mod matrix_stack;
#[cfg(test)]
pub mod approx;
