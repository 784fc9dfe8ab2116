use std::path::PathBuf;

use image::Rgb;
use slicestack::{DEFAULT_SLICE_SIZE, Volume, VolumeLoader, annotate_crosshair};

fn main() {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .expect("should have installed the logger");

    let directory = std::env::args().nth(1).unwrap_or_else(|| "slices".into());
    let volume = VolumeLoader::load_from_directory(&PathBuf::from(directory), DEFAULT_SLICE_SIZE)
        .expect("should have loaded slices from directory");

    let index = volume.dim().0 / 2;
    let sections = volume
        .cross_sections(index)
        .expect("should have resliced at the center of the stack");

    let red = Rgb([255, 0, 0]);
    let green = Rgb([0, 255, 0]);
    let blue = Rgb([0, 0, 255]);

    let planes = [
        ("axial", &sections.axial, red, green),
        ("coronal", &sections.coronal, blue, green),
        ("sagittal", &sections.sagittal, blue, red),
    ];
    for (name, plane, vertical_color, horizontal_color) in planes {
        let gray = Volume::slice_to_image(&plane.view());
        let annotated = annotate_crosshair(&gray, index, index, vertical_color, horizontal_color);
        annotated
            .save(format!("{name}.png"))
            .expect("should have saved cross-section");
        log::info!("wrote {name}.png");
    }
}
