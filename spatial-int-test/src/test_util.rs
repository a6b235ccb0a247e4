use rand::Rng;
use spatial_index::{Extent, MBRHandle, PointData, SpatialResult};
use std::path::{Path, PathBuf};
use std::time::Instant;
use std::{env, fs};

/// Runs `test` between `before` and `after`.
/// `after` runs even when the test fails or panics, so scratch files never leak.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> SpatialResult<()> + std::panic::RefUnwindSafe,
    B: Fn() -> SpatialResult<TestContext>,
    A: Fn(TestContext) -> SpatialResult<()>,
{
    let ctx = match before() {
        Ok(ctx) => ctx,
        Err(e) => panic!("Before run failed: {:?}", e),
    };

    let start_time = Instant::now();
    let outcome = std::panic::catch_unwind(|| test(ctx.clone()));
    let elapsed = start_time.elapsed();

    if let Err(e) = after(ctx) {
        eprintln!("Warning: After run failed: {:?}", e);
    }

    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(e)) => panic!("Test failed after {:?}: {:?}", elapsed, e),
        Err(panic_err) => std::panic::resume_unwind(panic_err),
    }
}

/// A scratch directory holding the index files of one test run.
#[derive(Clone)]
pub struct TestContext {
    path: String,
}

impl TestContext {
    pub fn new(path: String) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path of an index file inside the scratch directory.
    pub fn file(&self, name: &str) -> PathBuf {
        Path::new(&self.path).join(name)
    }
}

pub fn random_path() -> String {
    let id = uuid::Uuid::new_v4();
    env::temp_dir().join(id.to_string()).to_string_lossy().into_owned()
}

pub fn create_test_context() -> SpatialResult<TestContext> {
    let path = random_path();
    fs::create_dir_all(&path)?;
    Ok(TestContext::new(path))
}

pub fn cleanup(ctx: TestContext) -> SpatialResult<()> {
    if Path::new(ctx.path()).exists() {
        fs::remove_dir_all(ctx.path())?;
    }
    Ok(())
}

/// Uniformly scattered points with sequential addresses.
pub fn random_points(count: usize, bounds: &Extent) -> Vec<PointData> {
    let mut rng = rand::rng();
    (0..count)
        .map(|i| {
            PointData::new(
                rng.random_range(bounds.xmin..=bounds.xmax),
                rng.random_range(bounds.ymin..=bounds.ymax),
                i as i64,
            )
        })
        .collect()
}

/// Boxes of random size inside `bounds` with sequential handles.
pub fn random_boxes(count: usize, bounds: &Extent, max_side: f64) -> Vec<MBRHandle> {
    let mut rng = rand::rng();
    (0..count)
        .map(|i| {
            let x = rng.random_range(bounds.xmin..bounds.xmax);
            let y = rng.random_range(bounds.ymin..bounds.ymax);
            let w = rng.random_range(0.0..=max_side);
            let h = rng.random_range(0.0..=max_side);
            MBRHandle::new(Extent::new(x, y, x + w, y + h), i as i64)
        })
        .collect()
}

/// A random query window inside `bounds`.
pub fn random_window(bounds: &Extent) -> Extent {
    let mut rng = rand::rng();
    let x1 = rng.random_range(bounds.xmin..bounds.xmax);
    let x2 = rng.random_range(bounds.xmin..bounds.xmax);
    let y1 = rng.random_range(bounds.ymin..bounds.ymax);
    let y2 = rng.random_range(bounds.ymin..bounds.ymax);
    Extent::new(x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2))
}

/// Sorted addresses of the points inside `query`, edges inclusive.
pub fn expected_points(points: &[PointData], query: &Extent) -> Vec<i64> {
    let mut found: Vec<i64> = points
        .iter()
        .filter(|p| query.contains_point(p.x, p.y))
        .map(|p| p.address)
        .collect();
    found.sort_unstable();
    found
}

/// Sorted handles of the boxes not disjoint from `query`.
pub fn expected_boxes(boxes: &[MBRHandle], query: &Extent) -> Vec<i64> {
    let mut found: Vec<i64> = boxes
        .iter()
        .filter(|b| !b.extent.is_disjoint(query))
        .map(|b| b.handle)
        .collect();
    found.sort_unstable();
    found
}
