//! Integration tests for file-backed R-tree indexes.

use spatial_index::data_stream::{create_index_file, open_index_file};
use spatial_index::{Extent, MBRHandle, RTreeConfig, RTreeReader, RTreeWriter, SpatialReader};
use spatial_int_test::test_util::{
    cleanup, create_test_context, expected_boxes, random_boxes, random_window, run_test,
};
use std::io::{Seek, SeekFrom, Write};

#[test]
fn test_random_boxes_match_brute_force() {
    run_test(
        || create_test_context(),
        |ctx| {
            let bounds = Extent::new(0.0, 0.0, 500.0, 500.0);
            let boxes = random_boxes(3000, &bounds, 8.0);
            let path = ctx.file("random.rt");

            let mut writer = RTreeWriter::create(&path, 4, 12)?;
            writer.add_all(boxes.iter().copied())?;
            assert_eq!(writer.tree()?.len(), 3000);
            assert!(writer.tree()?.height() > 2);
            writer.close()?;

            let mut reader = RTreeReader::open(&path)?;
            assert_eq!(reader.config().node_low_size(), 4);
            assert_eq!(reader.config().node_high_size(), 12);

            for _ in 0..25 {
                let query = random_window(&bounds);
                let mut found: Vec<i64> = reader
                    .collect_extent(&query)?
                    .into_iter()
                    .map(|b| b.handle)
                    .collect();
                found.sort_unstable();
                assert_eq!(found, expected_boxes(&boxes, &query), "query {}", query);
            }
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_repeated_queries_return_same_boxes() {
    run_test(
        || create_test_context(),
        |ctx| {
            let bounds = Extent::new(-100.0, -100.0, 100.0, 100.0);
            let path = ctx.file("repeat.rt");

            let mut writer = RTreeWriter::create(&path, 2, 6)?;
            writer.add_all(random_boxes(800, &bounds, 5.0))?;
            writer.close()?;

            let mut reader = RTreeReader::open(&path)?;
            let query = Extent::new(-30.0, -40.0, 25.0, 10.0);
            let mut first: Vec<i64> = reader
                .search(&query)
                .map(|b| b.map(|b| b.handle))
                .collect::<Result<_, _>>()?;
            let mut second: Vec<i64> = reader
                .search(&query)
                .map(|b| b.map(|b| b.handle))
                .collect::<Result<_, _>>()?;
            first.sort_unstable();
            second.sort_unstable();
            assert_eq!(first, second);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_leaf_split_on_disk() {
    run_test(
        || create_test_context(),
        |ctx| {
            let path = ctx.file("split.rt");
            let mut writer = RTreeWriter::create(&path, 2, 4)?;
            for i in 0..5 {
                let x = i as f64 * 10.0;
                writer.add(MBRHandle::new(Extent::new(x, 0.0, x + 1.0, 1.0), i))?;
            }
            writer.close()?;

            let mut reader = RTreeReader::open(&path)?;
            let root = reader.read_node(reader.root_handle())?;
            assert!(!root.is_leaf);
            assert_eq!(root.entries.len(), 2);

            let mut handles = Vec::new();
            for child in &root.entries {
                let leaf = reader.read_node(child.handle as u64)?;
                assert!(leaf.is_leaf);
                let covered = leaf
                    .entries
                    .iter()
                    .fold(Extent::default(), |acc, e| acc.union(&e.extent));
                assert!(covered.is_equal(&child.extent, 1e-9));
                handles.extend(leaf.entries.iter().map(|e| e.handle));
            }
            handles.sort_unstable();
            assert_eq!(handles, vec![0, 1, 2, 3, 4]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_index_embedded_after_file_prefix() {
    run_test(
        || create_test_context(),
        |ctx| {
            let path = ctx.file("embedded.rt");
            let mut stream = create_index_file(&path)?;
            stream.write_all(b"spatial payload header")?;
            let prefix = stream.stream_position()?;

            let mut writer = RTreeWriter::at_current_position(stream, RTreeConfig::new(2, 4))?;
            for i in 0..50 {
                let x = (i % 10) as f64 * 2.0;
                let y = (i / 10) as f64 * 2.0;
                writer.add(MBRHandle::new(Extent::new(x, y, x + 1.0, y + 1.0), i))?;
            }
            writer.close()?;

            let mut input = open_index_file(&path)?;
            input.seek(SeekFrom::Start(prefix))?;
            let mut reader = RTreeReader::new(input)?;
            assert_eq!(reader.root_handle(), prefix + 8);

            let mut found: Vec<i64> = reader
                .collect_extent(&Extent::new(0.5, 0.5, 2.5, 2.5))?
                .into_iter()
                .map(|b| b.handle)
                .collect();
            found.sort_unstable();
            assert_eq!(found, vec![0, 1, 10, 11]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
