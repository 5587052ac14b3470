//! Integration tests for domain decomposition.
//!
//! These tests verify:
//! - Two tiles exchanging halos reproduce a single-tile run exactly
//! - Transport crosses the shared tile edge in both directions

use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

use baro_rs::solver::HaloField;
use baro_rs::{
    BarotropicConfig, BarotropicError, BarotropicSolver, BoundaryForcing, Field2D, Grid2D,
    Result, Side, SyncPoint,
};

const NX: usize = 16;
const NY: usize = 6;
const HALO: usize = 2;
const DX: f64 = 100.0;
const DEPTH: f64 = 10.0;
const STEPS: usize = 60;

fn config() -> BarotropicConfig {
    BarotropicConfig::new(2.0, 10)
}

fn bump(x: f64, y: f64) -> f64 {
    // Centred west of the tile edge at x = 800 m so the wave crosses it
    0.1 * (-((x - 650.0).powi(2) + (y - 300.0).powi(2)) / 200.0f64.powi(2)).exp()
}

/// Columns of `field` packed row by row.
fn pack(field: &Field2D, cols: std::ops::Range<isize>) -> Vec<f64> {
    let mut out = Vec::new();
    for j in 0..NY as isize {
        for i in cols.clone() {
            out.push(field.get(i, j));
        }
    }
    out
}

fn unpack(field: &mut Field2D, cols: std::ops::Range<isize>, values: &[f64]) {
    let mut it = values.iter();
    for j in 0..NY as isize {
        for i in cols.clone() {
            if let Some(&value) = it.next() {
                field.set(i, j, value);
            }
        }
    }
}

/// Halo exchange of one tile with the tile across a single x-edge, over
/// channels to the other thread.
struct EdgeExchange {
    send_cols: std::ops::Range<isize>,
    recv_cols: std::ops::Range<isize>,
    tx: Sender<Vec<Vec<f64>>>,
    rx: Receiver<Vec<Vec<f64>>>,
    sync_points: usize,
}

impl EdgeExchange {
    fn exchange(&mut self, _point: SyncPoint, fields: &mut [HaloField<'_>]) -> Result<()> {
        let outgoing = fields
            .iter()
            .map(|f| pack(&*f.field, self.send_cols.clone()))
            .collect();
        self.tx
            .send(outgoing)
            .map_err(|e| BarotropicError::HaloExchange(e.to_string()))?;
        let incoming = self
            .rx
            .recv()
            .map_err(|e| BarotropicError::HaloExchange(e.to_string()))?;
        for (f, values) in fields.iter_mut().zip(&incoming) {
            unpack(&mut *f.field, self.recv_cols.clone(), values);
        }
        self.sync_points += 1;
        Ok(())
    }
}

fn run_tile(grid: Grid2D, mut edge: EdgeExchange) -> (BarotropicSolver, usize) {
    let mut solver = BarotropicSolver::new(grid, config(), BoundaryForcing::closed()).unwrap();
    solver.set_initial_elevation(bump);
    let mut exchange =
        |point: SyncPoint, fields: &mut [HaloField<'_>]| -> Result<()> { edge.exchange(point, fields) };
    for _ in 0..STEPS {
        solver.step(&mut exchange).unwrap();
    }
    (solver, edge.sync_points)
}

#[test]
fn test_two_tiles_match_single_tile() {
    let global = Grid2D::flat(NX, NY, HALO, DX, DX, DEPTH).unwrap();
    let mut reference = BarotropicSolver::new(global, config(), BoundaryForcing::closed()).unwrap();
    reference.set_initial_elevation(bump);
    for _ in 0..STEPS {
        reference.step(&mut baro_rs::NoExchange).unwrap();
    }

    let half = NX / 2;
    let (h, n) = (HALO as isize, half as isize);
    let west_grid = Grid2D::tile(half, NY, HALO, DX, DX, (0, 0), |_, _| DEPTH)
        .unwrap()
        .with_neighbour(Side::East);
    let east_grid = Grid2D::tile(half, NY, HALO, DX, DX, (n, 0), |_, _| DEPTH)
        .unwrap()
        .with_neighbour(Side::West);
    assert!(west_grid.neighbours().east && !west_grid.neighbours().west);
    assert!(east_grid.neighbours().west);

    let (to_east, from_west) = channel();
    let (to_west, from_east) = channel();
    let west_edge = EdgeExchange {
        send_cols: n - h..n,
        recv_cols: n..n + h,
        tx: to_east,
        rx: from_east,
        sync_points: 0,
    };
    let east_edge = EdgeExchange {
        send_cols: 0..h,
        recv_cols: -h..0,
        tx: to_west,
        rx: from_west,
        sync_points: 0,
    };

    let ((west, west_syncs), (east, east_syncs)) = thread::scope(|s| {
        let w = s.spawn(move || run_tile(west_grid, west_edge));
        let e = s.spawn(move || run_tile(east_grid, east_edge));
        (w.join().unwrap(), e.join().unwrap())
    });
    assert_eq!(west_syncs, 2 * STEPS);
    assert_eq!(east_syncs, 2 * STEPS);

    let r = reference.state();
    let mut max_edge_transport = 0.0f64;
    for j in 0..NY as isize {
        for i in 0..NX as isize {
            let (tile, li) = if i < n { (west.state(), i) } else { (east.state(), i - n) };
            let at = format!("({}, {})", i, j);
            assert!((tile.elevation().z.get(li, j) - r.elevation().z.get(i, j)).abs() < 1e-12, "z{at}");
            assert!((tile.depth().d.get(li, j) - r.depth().d.get(i, j)).abs() < 1e-12, "D{at}");
            assert!((tile.transport().u.get(li, j) - r.transport().u.get(i, j)).abs() < 1e-12, "U{at}");
            assert!((tile.transport().v.get(li, j) - r.transport().v.get(i, j)).abs() < 1e-12, "V{at}");
        }
        // The face on the tile edge is owned by the west tile and mirrored east
        let edge = west.state().transport().u.get(n - 1, j);
        assert_eq!(east.state().transport().u.get(-1, j), edge);
        max_edge_transport = max_edge_transport.max(edge.abs());
    }
    assert!(max_edge_transport > 0.0, "no water crossed the tile edge");

    let volume = west.diagnostics().total_volume + east.diagnostics().total_volume;
    assert!((volume - reference.diagnostics().total_volume).abs() < 1e-6);
}
