//! Integration tests for file-backed quadtree indexes.

use spatial_index::data_stream::create_index_file;
use spatial_index::{
    Extent, PointData, QuadTreeConfig, QuadTreeReader, QuadTreeWriter, SpatialReader,
};
use spatial_int_test::test_util::{
    cleanup, create_test_context, expected_points, random_points, random_window, run_test,
};
use std::collections::HashSet;

#[test]
fn test_random_points_match_brute_force() {
    run_test(
        || create_test_context(),
        |ctx| {
            let bounds = Extent::new(0.0, 0.0, 1000.0, 1000.0);
            let points = random_points(5000, &bounds);
            let path = ctx.file("random.qt");

            // starts far smaller than the data so the root has to grow
            let mut writer = QuadTreeWriter::create(&path, 16, &Extent::new(0.0, 0.0, 10.0, 10.0))?;
            writer.add_points(points.iter().copied())?;
            assert_eq!(writer.tree()?.len(), 5000);
            assert!(writer.tree()?.overflow().is_empty());
            writer.close()?;

            let mut reader = QuadTreeReader::open(&path)?;
            for _ in 0..25 {
                let query = random_window(&bounds);
                let mut found: Vec<i64> = reader
                    .collect_extent(&query)?
                    .into_iter()
                    .map(|p| p.address)
                    .collect();
                found.sort_unstable();
                assert_eq!(found, expected_points(&points, &query), "query {}", query);
            }

            let everything = Extent::new(-1.0, -1.0, 1001.0, 1001.0);
            assert_eq!(reader.count_extent(&everything)?, 5000);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_repeated_queries_return_same_points() {
    run_test(
        || create_test_context(),
        |ctx| {
            let bounds = Extent::new(-50.0, -50.0, 50.0, 50.0);
            let points = random_points(2000, &bounds);
            let path = ctx.file("repeat.qt");

            let mut writer = QuadTreeWriter::create(&path, 8, &bounds)?;
            writer.add_points(points)?;
            writer.close()?;

            let mut reader = QuadTreeReader::open(&path)?;
            let query = Extent::new(-20.0, -10.0, 15.0, 30.0);

            let mut first: Vec<i64> = reader
                .search(&query)
                .map(|p| p.map(|p| p.address))
                .collect::<Result<_, _>>()?;
            let mut second: Vec<i64> = reader
                .search(&query)
                .map(|p| p.map(|p| p.address))
                .collect::<Result<_, _>>()?;
            first.sort_unstable();
            second.sort_unstable();
            assert_eq!(first, second);

            let unique: HashSet<i64> = first.iter().copied().collect();
            assert_eq!(unique.len(), first.len());
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_growth_toward_upper_left_on_disk() {
    run_test(
        || create_test_context(),
        |ctx| {
            let path = ctx.file("grow.qt");
            let mut writer = QuadTreeWriter::create(&path, 2, &Extent::new(0.0, 0.0, 50.0, 50.0))?;
            writer.add_point(PointData::new(10.0, 10.0, 1))?;
            writer.add_point(PointData::new(-20.0, 60.0, 2))?;
            writer.close()?;

            let mut reader = QuadTreeReader::open(&path)?;
            assert_eq!(reader.tree().root_level(), 17);
            assert_eq!(reader.tree().root_bounds(), Extent::new(-50.0, 0.0, 50.0, 100.0));

            let mut holder = None;
            reader.depth_first_search(|visit| {
                if visit.data.iter().any(|p| p.address == 2) {
                    holder = Some((visit.x, visit.y, visit.width, visit.level));
                }
            })?;
            assert_eq!(holder, Some((-50.0, 50.0, 50.0, 16)));

            let found = reader.collect_extent(&Extent::new(-25.0, 55.0, -15.0, 65.0))?;
            assert_eq!(found, vec![PointData::new(-20.0, 60.0, 2)]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_deep_subdivision_of_clustered_points() {
    run_test(
        || create_test_context(),
        |ctx| {
            let path = ctx.file("cluster.qt");
            let config = QuadTreeConfig::default().bucket_size(4).minimum_level(0);
            let stream = create_index_file(&path)?;
            let start = Extent::new(0.0, 0.0, 1024.0, 1024.0);
            let mut writer = QuadTreeWriter::with_config(stream, config, &start)?;
            for i in 0..200 {
                let offset = i as f64 * 0.001;
                writer.add_point(PointData::new(100.0 + offset, 100.0 + offset, i))?;
            }
            writer.close()?;

            let mut reader = QuadTreeReader::open(&path)?;
            let mut nodes = 0;
            let mut stored = 0;
            reader.depth_first_search(|visit| {
                nodes += 1;
                stored += visit.data.len();
            })?;
            assert_eq!(stored, 200);
            assert!(nodes > 4);

            assert_eq!(
                reader.count_extent(&Extent::new(100.0, 100.0, 100.0995, 100.0995))?,
                100
            );
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
