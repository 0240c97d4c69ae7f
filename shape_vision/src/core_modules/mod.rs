pub mod annotator;
pub mod contour_extractor;
pub mod frame_source;
pub mod mask_cleaner;
pub mod moments;
pub mod segmenter;
pub mod shape_filter;
