//! Integration tests for the quadtree overflow list.

use spatial_index::data_stream::create_index_file;
use spatial_index::{Extent, PointData, QuadTreeConfig, QuadTreeReader, QuadTreeWriter, SpatialReader};
use spatial_int_test::test_util::{cleanup, create_test_context, run_test};

fn capped_config() -> QuadTreeConfig {
    QuadTreeConfig::default()
        .bucket_size(4)
        .start_level(16)
        .maximum_level(16)
}

#[test]
fn test_overflow_survives_reopen() {
    run_test(
        || create_test_context(),
        |ctx| {
            let path = ctx.file("overflow.qt");
            let stream = create_index_file(&path)?;
            let start = Extent::new(0.0, 0.0, 100.0, 100.0);
            let mut writer = QuadTreeWriter::with_config(stream, capped_config(), &start)?;
            for i in 0..20 {
                writer.add_point(PointData::new(i as f64 * 5.0, 50.0, i))?;
            }
            writer.add_point(PointData::new(150.0, 150.0, 100))?;
            writer.add_point(PointData::new(-5.0, 20.0, 101))?;
            assert_eq!(writer.tree()?.overflow().len(), 2);
            assert_eq!(writer.tree()?.root_level(), 16);
            writer.close()?;

            let reader = QuadTreeReader::open(&path)?;
            assert_eq!(
                reader.tree().overflow(),
                &[
                    PointData::new(150.0, 150.0, 100),
                    PointData::new(-5.0, 20.0, 101)
                ][..]
            );
            assert_eq!(reader.tree().len(), 2);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_overflow_found_only_by_windows_leaving_root() {
    run_test(
        || create_test_context(),
        |ctx| {
            let path = ctx.file("window.qt");
            let stream = create_index_file(&path)?;
            let start = Extent::new(0.0, 0.0, 100.0, 100.0);
            let mut writer = QuadTreeWriter::with_config(stream, capped_config(), &start)?;
            writer.add_point(PointData::new(90.0, 90.0, 1))?;
            writer.add_point(PointData::new(150.0, 150.0, 2))?;
            writer.close()?;

            let mut reader = QuadTreeReader::open(&path)?;

            let inside = reader.collect_extent(&Extent::new(50.0, 50.0, 100.0, 100.0))?;
            assert_eq!(inside, vec![PointData::new(90.0, 90.0, 1)]);

            let mut straddling: Vec<i64> = reader
                .collect_extent(&Extent::new(80.0, 80.0, 160.0, 160.0))?
                .into_iter()
                .map(|p| p.address)
                .collect();
            straddling.sort_unstable();
            assert_eq!(straddling, vec![1, 2]);

            let outside = reader.collect_extent(&Extent::new(140.0, 140.0, 160.0, 160.0))?;
            assert_eq!(outside, vec![PointData::new(150.0, 150.0, 2)]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
