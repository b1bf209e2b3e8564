//! Test fixtures and helpers

use crate::search::SearchResult;
use hub_types::{Author, PluginRecord, PluginType};

/// Create a record with a summary
pub fn make_record(name: &str, summary: &str) -> PluginRecord {
    PluginRecord {
        summary: summary.to_string(),
        ..PluginRecord::new(name)
    }
}

/// Create a record declaring a python specifier
pub fn make_python_record(name: &str, python_version: &str) -> PluginRecord {
    PluginRecord {
        python_version: python_version.to_string(),
        ..PluginRecord::new(name)
    }
}

/// Create a record with operating system classifiers
pub fn make_os_record(name: &str, classifiers: &[&str]) -> PluginRecord {
    PluginRecord {
        operating_system: classifiers.iter().map(|c| (*c).to_string()).collect(),
        ..PluginRecord::new(name)
    }
}

pub fn names<'r>(results: &'r [SearchResult<'_>]) -> Vec<&'r str> {
    results.iter().map(|r| r.record.name.as_str()).collect()
}

/// A small but varied hub index
pub fn sample_index() -> Vec<PluginRecord> {
    let mut video = make_record("napari_video", "A napari plugin to read and view video files");
    video.display_name = Some("napari video".into());
    video.authors = vec![Author::new("Jannis Ahlers")];
    video.release_date = "2023-03-02T10:00:00Z".into();
    video.first_released = "2021-01-15".into();
    video.total_installs = 2_400;
    video.license = "BSD-3-Clause".into();
    video.python_version = ">=3.8".into();
    video.operating_system = vec!["Operating System :: OS Independent".into()];
    video.plugin_types = vec![PluginType::Reader];
    video.reader_file_extensions = vec![".mp4".into(), ".mov".into()];
    video.development_status = vec!["Development Status :: 4 - Beta".into()];

    let mut blobs = make_record("napari-segment-blobs-and-things-with-membranes", "Segment blobs and nuclei");
    blobs.display_name = Some("Segment Blobs and Things".into());
    blobs.authors = vec![Author::new("Robert Haase")];
    blobs.release_date = "2024-01-20".into();
    blobs.first_released = "2021-11-02".into();
    blobs.total_installs = 61_000;
    blobs.license = "BSD-3-Clause".into();
    blobs.python_version = ">=3.9".into();
    blobs.operating_system = vec!["Operating System :: OS Independent".into()];
    blobs.plugin_types = vec![PluginType::Widget];
    blobs.development_status = vec!["Development Status :: 5 - Production/Stable".into()];
    blobs.category.insert(
        "Workflow step".into(),
        vec!["Image segmentation".into()],
    );
    blobs.category_hierarchy.insert(
        "Workflow step".into(),
        vec![vec!["Image segmentation".into(), "Object segmentation".into()]],
    );

    let mut cellpose = make_record("cellpose-napari", "A napari plugin for anatomical segmentation with cellpose");
    cellpose.authors = vec![Author::new("Carsen Stringer"), Author::new("Marius Pachitariu")];
    cellpose.release_date = "2022-07-01".into();
    cellpose.first_released = "2021-02-01".into();
    cellpose.total_installs = 48_000;
    cellpose.license = "BSD-3-Clause".into();
    cellpose.python_version = ">=3.8,<3.11".into();
    cellpose.operating_system = vec![
        "Operating System :: POSIX :: Linux".into(),
        "Operating System :: Microsoft :: Windows".into(),
    ];
    cellpose.plugin_types = vec![PluginType::Widget];
    cellpose.category.insert(
        "Workflow step".into(),
        vec!["Image segmentation".into()],
    );
    cellpose.category.insert(
        "Image modality".into(),
        vec!["Fluorescence microscopy".into()],
    );

    let mut aicsimageio = make_record("napari-aicsimageio", "Multi-format reader for microscopy images");
    aicsimageio.authors = vec![Author::new("Eva Maxfield Brown"), Author::new("Jackson Maxfield Brown")];
    aicsimageio.release_date = "2023-09-12".into();
    aicsimageio.first_released = "2020-12-01".into();
    aicsimageio.total_installs = 90_000;
    aicsimageio.license = "BSD-3-Clause".into();
    aicsimageio.python_version = ">=3.9".into();
    aicsimageio.operating_system = vec![
        "Operating System :: MacOS :: MacOS X".into(),
        "Operating System :: POSIX :: Linux".into(),
    ];
    aicsimageio.plugin_types = vec![PluginType::Reader];
    aicsimageio.reader_file_extensions = vec![".czi".into(), ".tif".into(), ".nd2".into()];
    aicsimageio.development_status = vec!["Development Status :: 6 - Mature".into()];

    let mut writer = make_record("napari-tiff-writer", "Save layers as tiff");
    writer.release_date = "not a date".into();
    writer.first_released = "2022-05-05".into();
    writer.total_installs = 300;
    writer.license = "Proprietary".into();
    writer.python_version = "==3.9".into();
    writer.operating_system = vec!["Operating System :: Microsoft :: Windows".into()];
    writer.plugin_types = vec![PluginType::Writer];
    writer.writer_file_extensions = vec![".tif".into()];
    writer.reader_file_extensions = vec![".tif".into()];

    let mut theme = make_record("napari-solarized", "Solarized theme");
    theme.release_date = "2021-06-30".into();
    theme.first_released = "2021-06-30".into();
    theme.total_installs = 300;
    theme.license = "MIT".into();
    theme.python_version = String::new();
    theme.plugin_types = vec![PluginType::Theme];

    vec![video, blobs, cellpose, aicsimageio, writer, theme]
}
