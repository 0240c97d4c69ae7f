use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use shape_vision::{FrameSource, ImageFileSource, PipelineConfig, ShapePipeline};

const GRASS: Rgb<u8> = Rgb([40, 120, 40]);

fn square_mask(width: u32, height: u32, squares: &[(u32, u32, u32)]) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        let inside = squares
            .iter()
            .any(|&(x0, y0, side)| x >= x0 && x < x0 + side && y >= y0 && y < y0 + side);
        if inside { Luma([255]) } else { Luma([0]) }
    })
}

fn field_with_shapes() -> RgbImage {
    let mut frame = RgbImage::from_pixel(160, 120, GRASS);
    draw_filled_rect_mut(&mut frame, Rect::at(10, 10).of_size(40, 40), Rgb([220, 40, 40]));
    draw_filled_rect_mut(&mut frame, Rect::at(90, 50).of_size(50, 30), Rgb([240, 240, 240]));
    draw_filled_rect_mut(&mut frame, Rect::at(70, 100).of_size(6, 6), Rgb([30, 30, 200]));
    frame
}

#[test]
fn synthetic_square_recovers_four_vertices_and_center() {
    let pipeline = ShapePipeline::new(&PipelineConfig::color_range()).unwrap();
    let mask = square_mask(120, 100, &[(20, 20, 50)]);

    let shapes = pipeline.detect_in_mask(&mask);

    assert_eq!(shapes.len(), 1);
    let shape = &shapes[0];
    assert_eq!(shape.vertex_count(), 4);
    let centroid = shape.centroid.expect("square has a centroid");
    let true_center = 20.0 + 49.0 / 2.0;
    assert!((centroid.x as f64 - true_center).abs() <= 1.0);
    assert!((centroid.y as f64 - true_center).abs() <= 1.0);
}

#[test]
fn area_threshold_separates_kept_and_dropped_regions() {
    let pipeline = ShapePipeline::new(&PipelineConfig::color_range()).unwrap();
    // A side of n pixels traces a boundary enclosing (n - 1)^2: 23 -> 484, 24 -> 529.
    let mask = square_mask(120, 60, &[(5, 5, 23), (60, 5, 24)]);

    let shapes = pipeline.detect_in_mask(&mask);

    assert_eq!(shapes.len(), 1);
    assert_eq!(shapes[0].area, 529.0);
    assert!(shapes.iter().all(|s| s.area >= 500.0));
}

#[test]
fn edge_threshold_separates_kept_and_dropped_regions() {
    let pipeline = ShapePipeline::new(&PipelineConfig::edge_based()).unwrap();
    // 39 -> 1444 is under the 1500 minimum, 40 -> 1521 is over it.
    let mask = square_mask(140, 60, &[(5, 5, 39), (70, 5, 40)]);

    let shapes = pipeline.detect_in_mask(&mask);

    assert_eq!(shapes.len(), 1);
    assert_eq!(shapes[0].area, 1521.0);
}

#[test]
fn squares_touching_each_frame_edge_are_detected() {
    let pipeline = ShapePipeline::new(&PipelineConfig::color_range()).unwrap();
    let placements = [(0, 20), (60, 20), (30, 0), (30, 40)];

    for (x0, y0) in placements {
        let shapes = pipeline.detect_in_mask(&square_mask(100, 80, &[(x0, y0, 40)]));

        assert_eq!(shapes.len(), 1, "square at ({}, {})", x0, y0);
        assert_eq!(shapes[0].area, 1521.0);
        let c = shapes[0].centroid.unwrap();
        assert_eq!((c.x, c.y), (x0 as i32 + 19, y0 as i32 + 19));
        assert!(shapes[0]
            .polygon
            .iter()
            .all(|p| (0..100).contains(&p.x) && (0..80).contains(&p.y)));
    }
}

#[test]
fn fully_foreground_frame_is_one_shape() {
    let pipeline = ShapePipeline::new(&PipelineConfig::color_range()).unwrap();
    let frame = RgbImage::from_pixel(100, 80, Rgb([220, 40, 40]));

    let shapes = pipeline.detect(&frame);

    assert_eq!(shapes.len(), 1);
    assert_eq!(shapes[0].vertex_count(), 4);
    assert_eq!(shapes[0].area, 99.0 * 79.0);
}

#[test]
fn empty_mask_yields_no_shapes_and_untouched_frame() {
    let pipeline = ShapePipeline::new(&PipelineConfig::color_range()).unwrap();
    assert!(pipeline.detect_in_mask(&GrayImage::new(64, 48)).is_empty());

    let frame = RgbImage::from_pixel(64, 48, GRASS);
    let analysis = pipeline.process(&frame);
    assert!(analysis.shapes.is_empty());
    assert_eq!(analysis.annotated, frame);
}

#[test]
fn color_pipeline_finds_each_large_object_on_grass() {
    let pipeline = ShapePipeline::new(&PipelineConfig::color_range()).unwrap();
    let frame = field_with_shapes();

    let analysis = pipeline.process(&frame);

    assert_eq!(analysis.shapes.len(), 2);
    assert!(analysis.shapes.iter().all(|s| s.vertex_count() == 4));
    assert!(analysis.shapes.iter().all(|s| s.centroid.is_some()));
    assert_eq!(analysis.annotated.dimensions(), frame.dimensions());
    assert_ne!(analysis.annotated, frame);
}

#[test]
fn centroids_lie_within_polygon_bounds() {
    let pipeline = ShapePipeline::new(&PipelineConfig::color_range()).unwrap();
    for shape in pipeline.detect(&field_with_shapes()) {
        let c = shape.centroid.unwrap();
        let min_x = shape.polygon.iter().map(|p| p.x).min().unwrap();
        let max_x = shape.polygon.iter().map(|p| p.x).max().unwrap();
        let min_y = shape.polygon.iter().map(|p| p.y).min().unwrap();
        let max_y = shape.polygon.iter().map(|p| p.y).max().unwrap();
        assert!((min_x..=max_x).contains(&c.x));
        assert!((min_y..=max_y).contains(&c.y));
    }
}

#[test]
fn edge_pipeline_outlines_a_high_contrast_rectangle() {
    let pipeline = ShapePipeline::new(&PipelineConfig::edge_based()).unwrap();
    assert_eq!(pipeline.strategy_name(), "edge");

    let mut frame = RgbImage::from_pixel(120, 120, Rgb([0, 0, 0]));
    draw_filled_rect_mut(&mut frame, Rect::at(30, 30).of_size(60, 60), Rgb([255, 255, 255]));

    let shapes = pipeline.detect(&frame);

    assert_eq!(shapes.len(), 1);
    let c = shapes[0].centroid.unwrap();
    assert!((c.x - 60).abs() <= 2 && (c.y - 60).abs() <= 2);
    assert!(shapes[0].area >= 1500.0);
}

#[test]
fn still_pipeline_is_idempotent_on_the_same_file() {
    let path = std::env::temp_dir()
        .join(format!("shape_vision_idempotent_{}.png", std::process::id()));
    field_with_shapes().save(&path).unwrap();
    let pipeline = ShapePipeline::new(&PipelineConfig::color_range()).unwrap();

    let run = || {
        let mut source = ImageFileSource::open(&path).unwrap();
        let frame = source.next_frame().unwrap().unwrap();
        pipeline.process(&frame).annotated
    };
    let first = run();
    let second = run();
    std::fs::remove_file(&path).ok();

    assert_eq!(first, second);
}

#[test]
fn annotation_preserves_dimensions_for_arbitrary_frames() {
    let pipeline = ShapePipeline::new(&PipelineConfig::color_range()).unwrap();
    for (w, h) in [(1, 1), (3, 17), (64, 5), (200, 150)] {
        let frame = RgbImage::from_fn(w, h, |x, y| {
            Rgb([(x * 37 % 256) as u8, (y * 91 % 256) as u8, ((x + y) % 256) as u8])
        });
        assert_eq!(pipeline.process(&frame).annotated.dimensions(), (w, h));
    }
}
