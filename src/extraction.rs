use std::cmp::Ordering;

use crate::traits::GraspCandidateExtractor;
use crate::types::{GraspCandidate, PredictionMaps};

/// Greedy peak search over the quality map.
///
/// Peaks are taken in descending quality order; any pixel within the
/// suppression radius (Chebyshev distance) of an already accepted peak is
/// discarded, so near-duplicate detections of the same object collapse to
/// the single strongest one.
pub struct QualityMapExtractor {
    /// Quality below this never becomes a candidate.
    pub min_quality: f32,
    /// Minimum spacing between accepted peaks, in map pixels.
    pub suppression_radius: usize,
    pub max_candidates: usize,
}

impl Default for QualityMapExtractor {
    fn default() -> Self {
        QualityMapExtractor {
            min_quality: 0.2,
            suppression_radius: 20,
            max_candidates: 3,
        }
    }
}

fn chebyshev(a: (usize, usize), b: (usize, usize)) -> usize {
    let dr = if a.0 > b.0 { a.0 - b.0 } else { b.0 - a.0 };
    let dc = if a.1 > b.1 { a.1 - b.1 } else { b.1 - a.1 };
    dr.max(dc)
}

impl GraspCandidateExtractor for QualityMapExtractor {
    fn extract(&self, maps: &PredictionMaps) -> Vec<GraspCandidate> {
        let mut peaks: Vec<((usize, usize), f32)> = maps
            .quality
            .indexed_iter()
            .filter(|(_, &quality)| quality > 0. && quality >= self.min_quality)
            .map(|(center, &quality)| (center, quality))
            .collect();

        peaks.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let mut candidates: Vec<GraspCandidate> = Vec::new();
        for (center, quality) in peaks {
            if candidates.len() == self.max_candidates {
                break;
            }

            let suppressed = candidates
                .iter()
                .any(|picked| chebyshev(picked.center, center) <= self.suppression_radius);
            if suppressed {
                continue;
            }

            candidates.push(GraspCandidate {
                center,
                angle: f64::from(maps.angle[center]),
                width: f64::from(maps.width[center]),
                quality: f64::from(quality),
            });
        }

        candidates
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;

    use super::*;

    fn maps(shape: (usize, usize)) -> PredictionMaps {
        PredictionMaps {
            quality: Array2::zeros(shape),
            angle: Array2::zeros(shape),
            width: Array2::zeros(shape),
        }
    }

    #[test]
    fn picks_the_strongest_peak_with_its_angle_and_width() {
        let mut maps = maps((480, 640));
        maps.quality[[240, 320]] = 0.9;
        maps.angle[[240, 320]] = 0.7;
        maps.width[[240, 320]] = 35.;

        let extractor = QualityMapExtractor::default();
        let candidates = extractor.extract(&maps);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].center, (240, 320));
        assert!((candidates[0].angle - 0.7).abs() < 1e-6);
        assert!((candidates[0].width - 35.).abs() < 1e-6);
    }

    #[test]
    fn orders_candidates_best_first() {
        let mut maps = maps((480, 640));
        maps.quality[[100, 100]] = 0.5;
        maps.quality[[300, 500]] = 0.8;
        maps.quality[[400, 200]] = 0.3;

        let candidates = QualityMapExtractor::default().extract(&maps);

        let centers: Vec<_> = candidates.iter().map(|c| c.center).collect();
        assert_eq!(centers, vec![(300, 500), (100, 100), (400, 200)]);
    }

    #[test]
    fn suppresses_neighbors_of_a_stronger_peak() {
        let mut maps = maps((480, 640));
        maps.quality[[240, 320]] = 0.9;
        maps.quality[[245, 330]] = 0.8;
        maps.quality[[240, 400]] = 0.7;

        let candidates = QualityMapExtractor::default().extract(&maps);

        let centers: Vec<_> = candidates.iter().map(|c| c.center).collect();
        assert_eq!(centers, vec![(240, 320), (240, 400)]);
    }

    #[test]
    fn below_threshold_map_yields_nothing() {
        let mut maps = maps((480, 640));
        maps.quality[[240, 320]] = 0.1;

        assert!(QualityMapExtractor::default().extract(&maps).is_empty());
    }

    #[test]
    fn respects_the_candidate_cap() {
        let mut maps = maps((480, 640));
        for i in 0..10 {
            maps.quality[[i * 40, i * 60]] = 0.9 - i as f32 * 0.01;
        }

        let candidates = QualityMapExtractor::default().extract(&maps);
        assert_eq!(candidates.len(), 3);
    }
}
