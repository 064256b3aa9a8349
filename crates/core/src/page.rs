use serde::{Deserialize, Serialize};

/// Raw render signals for one page-like element, as sampled from the DOM.
///
/// Samples carry no identity; the position in the sampled list is the index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSample {
    /// Rendered height in CSS pixels (`offsetHeight`)
    pub height: f64,
    pub has_image: bool,
    pub has_canvas: bool,
    pub has_svg: bool,
    /// Length of the trimmed text content
    pub text_length: usize,
}

/// Classification rule deciding whether a page has rendered.
///
/// A page counts as loaded when it is taller than `min_height` and shows any
/// one render signal: an image, a canvas, an svg, or more than
/// `min_text_length` characters of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentPredicate {
    pub min_height: f64,
    pub min_text_length: usize,
}

impl Default for ContentPredicate {
    fn default() -> Self {
        Self {
            min_height: 100.0,
            min_text_length: 50,
        }
    }
}

impl ContentPredicate {
    pub fn is_loaded(&self, sample: &PageSample) -> bool {
        sample.height > self.min_height
            && (sample.has_image
                || sample.has_canvas
                || sample.text_length > self.min_text_length
                || sample.has_svg)
    }
}

/// Point-in-time classification of every discovered page.
///
/// `loaded` and `unloaded` are ascending and together cover `0..total`
/// exactly once. The only constructor is [`LoadStatus::classify`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadStatus {
    total: usize,
    loaded: Vec<usize>,
    unloaded: Vec<usize>,
}

impl LoadStatus {
    pub fn classify(samples: &[PageSample], predicate: &ContentPredicate) -> Self {
        let (loaded, unloaded): (Vec<usize>, Vec<usize>) =
            (0..samples.len()).partition(|&i| predicate.is_loaded(&samples[i]));
        Self {
            total: samples.len(),
            loaded,
            unloaded,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn loaded(&self) -> &[usize] {
        &self.loaded
    }

    pub fn unloaded(&self) -> &[usize] {
        &self.unloaded
    }

    pub fn is_complete(&self) -> bool {
        self.unloaded.is_empty()
    }
}

/// One pass of classify-then-retry inside the verification phase.
#[derive(Debug, Clone)]
pub struct VerificationRound {
    /// 1-based round number
    pub round: usize,
    pub status: LoadStatus,
    /// Indices that were scrolled into view again this round
    pub retried: Vec<usize>,
}

/// Final coverage reported once the verifier is done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    pub total: usize,
    pub loaded: usize,
    pub unloaded: usize,
    /// Verification rounds entered (0 when nothing was discovered)
    pub rounds: usize,
}

impl LoadReport {
    pub fn from_status(status: &LoadStatus, rounds: usize) -> Self {
        Self {
            total: status.total(),
            loaded: status.loaded().len(),
            unloaded: status.unloaded().len(),
            rounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(height: f64) -> PageSample {
        PageSample {
            height,
            ..Default::default()
        }
    }

    #[test]
    fn any_single_signal_is_enough() {
        let p = ContentPredicate::default();
        let base = sample(800.0);
        assert!(!p.is_loaded(&base));
        assert!(p.is_loaded(&PageSample { has_image: true, ..base.clone() }));
        assert!(p.is_loaded(&PageSample { has_canvas: true, ..base.clone() }));
        assert!(p.is_loaded(&PageSample { has_svg: true, ..base.clone() }));
        assert!(p.is_loaded(&PageSample { text_length: 51, ..base.clone() }));
        assert!(!p.is_loaded(&PageSample { text_length: 50, ..base }));
    }

    #[test]
    fn height_threshold_is_strict() {
        let p = ContentPredicate::default();
        let at = PageSample { has_canvas: true, ..sample(100.0) };
        let above = PageSample { has_canvas: true, ..sample(100.5) };
        assert!(!p.is_loaded(&at));
        assert!(p.is_loaded(&above));
    }

    #[test]
    fn classification_partitions_all_indices() {
        let p = ContentPredicate::default();
        let samples: Vec<PageSample> = (0..9)
            .map(|i| PageSample { has_image: i % 3 == 0, ..sample(400.0) })
            .collect();
        let status = LoadStatus::classify(&samples, &p);

        assert_eq!(status.total(), 9);
        assert_eq!(status.loaded(), &[0, 3, 6]);
        assert_eq!(status.unloaded(), &[1, 2, 4, 5, 7, 8]);

        let mut all: Vec<usize> = status.loaded().iter().chain(status.unloaded()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn empty_container_is_complete() {
        let status = LoadStatus::classify(&[], &ContentPredicate::default());
        assert!(status.is_complete());
        assert_eq!(LoadReport::from_status(&status, 0), LoadReport::default());
    }
}
