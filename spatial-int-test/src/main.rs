use spatial_index::{
    Extent, QuadTreeReader, QuadTreeWriter, RTreeReader, RTreeWriter, SpatialReader,
    SpatialResult,
};
use spatial_int_test::test_util::{cleanup, create_test_context, random_boxes, random_points};

fn main() -> SpatialResult<()> {
    println!("Starting stress test...");
    let ctx = create_test_context()?;

    let count = 1000000;
    let bounds = Extent::new(-180.0, -90.0, 180.0, 90.0);
    let query = Extent::new(-10.0, -10.0, 10.0, 10.0);

    let points = random_points(count, &bounds);
    let path = ctx.file("points.qt");
    let start = std::time::Instant::now();
    let mut writer = QuadTreeWriter::create(&path, 32, &bounds)?;
    writer.add_points(points)?;
    writer.close()?;
    println!("Wrote {} points in {:?}", count, start.elapsed());

    let start = std::time::Instant::now();
    let mut reader = QuadTreeReader::open(&path)?;
    let found = reader.count_extent(&query)?;
    println!("Found {} points in {:?}", found, start.elapsed());

    let boxes = random_boxes(count, &bounds, 0.5);
    let path = ctx.file("boxes.rt");
    let start = std::time::Instant::now();
    let mut writer = RTreeWriter::create(&path, 10, 20)?;
    writer.add_all(boxes)?;
    writer.close()?;
    println!("Wrote {} boxes in {:?}", count, start.elapsed());

    let start = std::time::Instant::now();
    let mut reader = RTreeReader::open(&path)?;
    let found = reader.count_extent(&query)?;
    println!("Found {} boxes in {:?}", found, start.elapsed());

    cleanup(ctx)
}
