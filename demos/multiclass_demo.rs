//! Multiclass Training Demonstration
//!
//! Trains one-vs-one and one-vs-rest models on a synthetic three-class
//! problem and compares their predictions, calibrated probabilities and
//! multilabel output.

use msvm::api::Svm;
use msvm::core::{Decomposition, SparseVector};
use msvm::data::VecDataset;

fn point(x: f64, y: f64) -> SparseVector {
    SparseVector::new(vec![0, 1], vec![x, y])
}

fn make_dataset() -> VecDataset {
    let mut features = Vec::new();
    let mut labels = Vec::new();
    for (class, (cx, cy)) in [(0usize, (0.0, 0.0)), (1, (10.0, 0.0)), (2, (5.0, 10.0))] {
        for (dx, dy) in [
            (0.0, 0.0),
            (0.5, 0.2),
            (-0.4, 0.3),
            (0.2, -0.5),
            (-0.1, -0.2),
            (0.3, 0.4),
        ] {
            features.push(point(cx + dx, cy + dy));
            labels.push(class);
        }
    }
    VecDataset::new(features, labels).expect("valid dataset")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== Multiclass SVM Demonstration ===");
    println!();

    let dataset = make_dataset();
    let queries = [
        ("cluster 0 center", point(0.0, 0.0)),
        ("cluster 1 center", point(10.0, 0.0)),
        ("cluster 2 center", point(5.0, 10.0)),
        ("between 0 and 1", point(5.0, 0.0)),
    ];

    println!("--- One-vs-one, majority voting ---");
    let ovo = Svm::new()
        .with_c(1.0)
        .with_probabilities(true)
        .learn(&dataset)?;
    println!(
        "{} machines, training accuracy {:.1}%",
        ovo.machines().len(),
        ovo.evaluate(&dataset)? * 100.0
    );
    for (name, query) in &queries {
        let label = ovo.classify(query)?;
        let probs = ovo.predict_probabilities(query)?;
        let formatted: Vec<String> = probs.iter().map(|p| format!("{:.3}", p)).collect();
        println!("  {:<18} -> class {} [{}]", name, label, formatted.join(", "));
    }
    println!();

    println!("--- One-vs-rest, argmax score ---");
    let ovr = Svm::new()
        .with_c(1.0)
        .with_decomposition(Decomposition::OneVsRest)
        .learn(&dataset)?;
    println!(
        "{} machines, training accuracy {:.1}%",
        ovr.machines().len(),
        ovr.evaluate(&dataset)? * 100.0
    );
    for (name, query) in &queries {
        let label = ovr.classify(query)?;
        let bits = ovr.predict_multilabel(query)?;
        let members: Vec<String> = bits
            .iter()
            .enumerate()
            .filter(|(_, &b)| b)
            .map(|(c, _)| c.to_string())
            .collect();
        println!(
            "  {:<18} -> class {}, multilabel {{{}}}",
            name,
            label,
            members.join(", ")
        );
    }

    Ok(())
}
