//! Numerical building blocks: the fit basis, least squares, polynomial roots,
//! and open-interval quadrature.

pub mod basis;
pub mod ols;
pub mod quadrature;
pub mod roots;

pub use basis::*;
pub use ols::*;
pub use quadrature::*;
pub use roots::*;
