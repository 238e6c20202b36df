use std::error::Error;
use std::fs;
use std::io;
use std::time::Instant;

use clap::Parser;

use rayon::prelude::*;

mod raytracing;
use raytracing::canvas::Canvas;
use raytracing::core::render_pixel;
use raytracing::parser::{SceneDescription, SceneParser};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// the input path to the scene file
    scene: String,
    /// the path where is saved the rendered image
    #[arg(short, long, default_value = "output.png")]
    output: String,
    /// maximum number of recursive reflection bounces per ray
    #[arg(short, long, default_value_t = 3)]
    depth: u32,
    /// paint the result to the terminal as ANSI color blocks instead of saving it
    #[arg(long, default_value = "false")]
    terminal: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let content = fs::read_to_string(&args.scene)?;
    let mut parser = SceneParser::new(&content);
    let parser_result = parser.parse_scene();
    if let Err(parser_error) = parser_result {
        parser_error.print_error_location(&content);
        return Err(Box::from(format!("parser error {}", parser_error.message)));
    }

    let SceneDescription {
        width,
        height,
        viewport,
        camera,
        scene,
    } = parser_result.unwrap();

    log::debug!(
        "scene has {} spheres and {} lights",
        scene.objects.len(),
        scene.lights.len()
    );

    let mut canvas = Canvas::new(width, height);
    log::debug!(
        "canvas bounds: left {} right {} bottom {} top {}",
        canvas.left(),
        canvas.right(),
        canvas.bottom(),
        canvas.top()
    );

    // measure time
    let start = Instant::now();
    // every pixel only reads the scene, so the whole frame is a parallel map
    let coordinates: Vec<(i32, i32)> = canvas.coordinates().collect();
    let colors: Vec<_> = coordinates
        .par_iter()
        .map(|&pixel| {
            render_pixel(
                pixel,
                &viewport,
                canvas.dimensions(),
                &camera,
                &scene,
                args.depth,
            )
        })
        .collect();
    for (&(x, y), color) in coordinates.iter().zip(colors) {
        canvas.put_pixel(x, y, color);
    }

    log::info!("rendered {}x{} pixels in {:?}", width, height, start.elapsed());

    if args.terminal {
        canvas.paint(&mut io::stdout().lock())?;
    } else {
        canvas.save(&args.output)?;
        log::info!("saved {}", args.output);
    }
    Ok(())
}
