use std::path::Path;

use anyhow::{Context, ensure};
use clap::ArgMatches;
use incept_googlenet::*;
use ndarray::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Guess {
    pub class: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub probability: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub image: String,
    pub top: Vec<Guess>,
}

/// Decode any format `image` knows into a `(H, W, 3)` u8 array.
pub fn load_image(path: &Path) -> InceptResult<RawImage> {
    let bytes = fs_err::read(path)?;
    let rgb = image::load_from_memory(&bytes)
        .with_context(|| format!("Decoding {}", path.display()))?
        .to_rgb8();
    let (w, h) = rgb.dimensions();
    let pixels = Array3::from_shape_vec((h as usize, w as usize, 3), rgb.into_raw())?;
    Ok(pixels.into())
}

pub fn load_labels(path: &Path) -> InceptResult<Vec<String>> {
    let text = fs_err::read_to_string(path)?;
    Ok(text.lines().map(|l| l.trim().to_string()).collect())
}

/// Indices of the `k` largest probabilities, best first.
pub fn top_k(row: ArrayView1<f32>, k: usize) -> Vec<(usize, f32)> {
    let mut ranked: Vec<(usize, f32)> = row.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(k);
    ranked
}

fn classification(
    image: &str,
    row: ArrayView1<f32>,
    k: usize,
    labels: Option<&[String]>,
) -> Classification {
    let top = top_k(row, k)
        .into_iter()
        .map(|(class, probability)| Guess {
            class,
            label: labels.and_then(|l| l.get(class)).cloned(),
            probability,
        })
        .collect();
    Classification { image: image.to_string(), top }
}

pub fn handle(matches: &ArgMatches) -> InceptResult<()> {
    let threads = match matches.value_of("threads") {
        Some(t) => t.parse::<usize>().with_context(|| format!("Invalid thread count {:?}", t))?,
        None => num_cpus::get(),
    };
    let backend = if threads <= 1 { Backend::Cpu } else { Backend::MultiThread(threads) };
    let mut config = EngineConfig::default().with_backend(backend);
    match matches.value_of("weights") {
        Some(weights) => config = config.with_npz(weights),
        None => warn!("No weights given, classifying with random parameters"),
    }
    let top = matches.value_of("top").unwrap_or("5");
    let top = top.parse::<usize>().with_context(|| format!("Invalid --top {:?}", top))?;
    let labels = matches.value_of("labels").map(|p| load_labels(Path::new(p))).transpose()?;

    let paths: Vec<&str> = matches.values_of("images").map(|v| v.collect()).unwrap_or_default();
    let images = paths
        .iter()
        .map(|p| load_image(Path::new(p)))
        .collect::<InceptResult<Vec<_>>>()?;
    info!("Loaded {} images", images.len());

    let net = GoogLeNet::new(&config)?;
    let oversample = !matches.is_present("no-oversample");
    let probs = net.predict(&images, oversample)?;
    let probs = probs.to_array_view().into_dimensionality::<Ix2>()?;
    if let Some(labels) = &labels {
        ensure!(
            labels.len() >= probs.ncols(),
            "Labels file has {} lines for {} classes",
            labels.len(),
            probs.ncols()
        );
    }

    let results: Vec<Classification> = paths
        .iter()
        .zip(probs.outer_iter())
        .map(|(path, row)| classification(path, row, top, labels.as_deref()))
        .collect();
    if matches.is_present("json") {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for result in &results {
            println!("{}", result.image);
            for guess in &result.top {
                println!(
                    "  {:>4} {:.4} {}",
                    guess.class,
                    guess.probability,
                    guess.label.as_deref().unwrap_or("")
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_k_is_sorted_and_truncated() {
        let row = arr1(&[0.1f32, 0.5, 0.2, 0.2]);
        assert_eq!(top_k(row.view(), 3), vec![(1, 0.5), (2, 0.2), (3, 0.2)]);
        assert_eq!(top_k(row.view(), 10).len(), 4);
    }

    #[test]
    fn labels_are_attached() {
        let labels = vec!["tench".to_string(), "goldfish".to_string()];
        let row = arr1(&[0.25f32, 0.75]);
        let c = classification("fish.png", row.view(), 1, Some(&labels));
        assert_eq!(c.top, vec![Guess { class: 1, label: Some("goldfish".into()), probability: 0.75 }]);
        let json = serde_json::to_string(&classification("x", row.view(), 1, None)).unwrap();
        assert!(!json.contains("label"));
    }

    #[test]
    fn decode_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red.png");
        image::RgbImage::from_pixel(5, 3, image::Rgb([255, 0, 0])).save(&path).unwrap();
        let img = load_image(&path).unwrap();
        assert_eq!(img.shape(), &[3, 5, 3]);
        let RawImage::U8(pixels) = img else { panic!("expected u8 pixels") };
        assert_eq!(pixels[[2, 4, 0]], 255);
        assert_eq!(pixels[[2, 4, 1]], 0);
    }

    #[test]
    fn labels_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.txt");
        fs_err::write(&path, "tench\ngoldfish \n").unwrap();
        assert_eq!(load_labels(&path).unwrap(), vec!["tench", "goldfish"]);
    }

    #[test]
    fn missing_image_is_an_error() {
        assert!(load_image(Path::new("/nonexistent/cat.jpg")).is_err());
    }
}
