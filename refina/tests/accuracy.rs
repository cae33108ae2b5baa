//! Statistical accuracy guarantees of the refined ("accurate") variants.
//!
//! Trials use integer-valued matrices and solutions so that every product is
//! exactly representable in each backend and errors can be measured against
//! the true solution.

use rand::prelude::*;

use refina::linalg::equilibration::Scaling;
use refina::linalg::solvers::{Llt, LltParams, PartialPivLu, PartialPivLuParams};
use refina::stats::{error_stats, random_int_mat};
use refina::{Big, DoubleF64, Mat, RealField, Widening};

struct Improvement {
    mean_simple: f64,
    mean_refined: f64,
    max_refined: f64,
}

fn solve_improvement<T: Widening>(trials: usize, n: usize, seed: u64) -> Improvement {
    let rng = &mut StdRng::seed_from_u64(seed);

    let mut mean_simple = 0.0;
    let mut mean_refined = 0.0;
    let mut max_refined = 0.0f64;
    let mut measured = 0usize;

    while measured < trials {
        let A = random_int_mat::<T, _>(rng, n, n, 9);
        let x_true = random_int_mat::<T, _>(rng, n, 1, 9);
        let b = &A * &x_true;

        let lu = PartialPivLu::new_with(
            A.as_ref(),
            PartialPivLuParams {
                scaling: Scaling::Row,
            },
        );
        if lu.is_singular() {
            continue;
        }

        let simple = lu.solve(b.as_ref()).unwrap();
        let refined = lu.solve_accurate(b.as_ref()).unwrap();

        let s = error_stats(x_true.as_ref(), simple.as_ref());
        let r = error_stats(x_true.as_ref(), refined.as_ref());
        mean_simple += s.mean;
        mean_refined += r.mean;
        max_refined = max_refined.max(r.max);
        measured += 1;
    }

    Improvement {
        mean_simple: mean_simple / trials as f64,
        mean_refined: mean_refined / trials as f64,
        max_refined,
    }
}

#[test]
fn refined_solve_beats_simple_solve_f64() {
    let imp = solve_improvement::<f64>(12, 24, 0);
    assert!(imp.mean_refined * 25.0 <= imp.mean_simple);
    assert!(imp.max_refined <= 1e-13);
}

#[test]
fn refined_solve_beats_simple_solve_double() {
    let imp = solve_improvement::<DoubleF64>(8, 16, 1);
    assert!(imp.mean_refined * 7.0 <= imp.mean_simple);
    assert!(imp.max_refined <= 1e-28);
}

#[test]
fn refined_solve_beats_simple_solve_big() {
    let imp = solve_improvement::<Big>(4, 12, 2);
    assert!(imp.mean_refined * 4.0 <= imp.mean_simple);
    assert!(imp.max_refined <= 1e-70);
}

#[test]
fn refined_inverse_tightens_the_residual() {
    let rng = &mut StdRng::seed_from_u64(3);
    let n = 16;

    let A = random_int_mat::<f64, _>(rng, n, n, 9);
    let lu = PartialPivLu::new(A.as_ref());
    assert!(!lu.is_singular());

    let identity = Mat::<f64>::identity(n);
    let simple = lu.inverse().unwrap();
    let refined = lu.inverse_accurate().unwrap();

    let r_simple = error_stats(identity.as_ref(), (&A * &simple).as_ref());
    let r_refined = error_stats(identity.as_ref(), (&A * &refined).as_ref());

    assert!(r_refined.max <= r_simple.max);
    assert!(r_refined.max <= 1e-12);
}

fn spd_improvement<T: Widening>(trials: usize, n: usize, seed: u64) -> Improvement {
    let rng = &mut StdRng::seed_from_u64(seed);

    let mut mean_simple = 0.0;
    let mut mean_refined = 0.0;
    let mut max_refined = 0.0f64;

    for _ in 0..trials {
        // BᵀB + n·I keeps integer entries and is positive definite
        let B = random_int_mat::<T, _>(rng, n, n, 4);
        let mut A = &B.transpose() * &B;
        for i in 0..n {
            let bumped = A[(i, i)].add(&T::from_f64(n as f64));
            A[(i, i)] = bumped;
        }
        let x_true = random_int_mat::<T, _>(rng, n, 1, 9);
        let b = &A * &x_true;

        let llt = Llt::new_with(
            A.as_ref(),
            LltParams {
                scaling: Scaling::Row,
            },
        )
        .unwrap();

        let simple = llt.solve(b.as_ref());
        let refined = llt.solve_accurate(b.as_ref());

        let s = error_stats(x_true.as_ref(), simple.as_ref());
        let r = error_stats(x_true.as_ref(), refined.as_ref());
        mean_simple += s.mean;
        mean_refined += r.mean;
        max_refined = max_refined.max(r.max);
    }

    Improvement {
        mean_simple: mean_simple / trials as f64,
        mean_refined: mean_refined / trials as f64,
        max_refined,
    }
}

#[test]
fn refined_spd_solve_beats_simple_solve_f64() {
    let imp = spd_improvement::<f64>(8, 16, 4);
    assert!(imp.mean_refined * 4.0 <= imp.mean_simple);
    assert!(imp.max_refined <= 1e-13);
}

#[test]
fn global_scaling_default_is_consumed_at_construction() {
    // runs in its own process; the other tests in this binary pass explicit
    // scaling policies
    let A = Mat::<f64>::from_f64_rows(&[&[1e-8, 2.0], &[3.0, 4.0]]);
    let b = Mat::<f64>::from_f64_rows(&[&[2.0], &[7.0]]);

    assert!(refina::get_global_row_scaling());
    refina::set_global_row_scaling(false);
    let unscaled = PartialPivLu::new(A.as_ref());
    refina::set_global_row_scaling(true);
    let scaled = PartialPivLu::new(A.as_ref());

    let xu = unscaled.solve_accurate(b.as_ref()).unwrap();
    let xs = scaled.solve_accurate(b.as_ref()).unwrap();
    for i in 0..2 {
        assert!((xu[(i, 0)] - xs[(i, 0)]).abs() <= 1e-12);
    }
}
