pub mod partial_pivoting;
