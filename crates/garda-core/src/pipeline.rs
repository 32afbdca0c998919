//! Post-processing pipeline description

use serde::{Deserialize, Serialize};

/// Bloom parameters expressed as strength / radius / threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomParams {
    pub strength: f32,
    pub radius: f32,
    pub threshold: f32,
}

impl Default for BloomParams {
    fn default() -> Self {
        Self {
            strength: 2.0,
            radius: 0.4,
            threshold: 0.85,
        }
    }
}

impl BloomParams {
    /// Composite intensity for an energy-conserving mip-chain bloom
    pub fn intensity(&self) -> f32 {
        (self.strength * 0.15).clamp(0.0, 1.0)
    }

    /// Boost applied to the blurriest mips; wider radius spreads the glow
    pub fn low_frequency_boost(&self) -> f32 {
        (self.radius * 1.75).clamp(0.0, 1.0)
    }

    /// Upper cut-off of the blur spectrum
    pub fn high_pass_frequency(&self) -> f32 {
        (0.5 + self.radius).clamp(0.0, 1.0)
    }
}

/// One stage of the frame pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Pass {
    /// Base scene render
    Render,
    Bloom(BloomParams),
}

/// Ordered passes applied to every frame, plus the target size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostProcessPipeline {
    passes: Vec<Pass>,
    size: (u32, u32),
}

impl PostProcessPipeline {
    /// Base render followed by bloom
    pub fn with_bloom(bloom: BloomParams, width: u32, height: u32) -> Self {
        Self {
            passes: vec![Pass::Render, Pass::Bloom(bloom)],
            size: (width, height),
        }
    }

    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    pub fn bloom(&self) -> Option<&BloomParams> {
        self.passes.iter().find_map(|p| match p {
            Pass::Bloom(b) => Some(b),
            Pass::Render => None,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_order() {
        let pipeline = PostProcessPipeline::with_bloom(BloomParams::default(), 800, 600);
        assert_eq!(pipeline.passes().len(), 2);
        assert_eq!(pipeline.passes()[0], Pass::Render);
        assert!(matches!(pipeline.passes()[1], Pass::Bloom(_)));
        assert_eq!(pipeline.bloom().map(|b| b.strength), Some(2.0));
    }

    #[test]
    fn test_resize() {
        let mut pipeline = PostProcessPipeline::with_bloom(BloomParams::default(), 800, 600);
        pipeline.set_size(1024, 768);
        pipeline.set_size(1024, 768);
        assert_eq!(pipeline.size(), (1024, 768));
    }

    #[test]
    fn test_bloom_mapping_is_clamped() {
        let bloom = BloomParams { strength: 20.0, radius: 2.0, threshold: 0.0 };
        assert_eq!(bloom.intensity(), 1.0);
        assert_eq!(bloom.low_frequency_boost(), 1.0);
        assert_eq!(bloom.high_pass_frequency(), 1.0);

        let defaults = BloomParams::default();
        assert!((defaults.intensity() - 0.3).abs() < 1e-6);
        assert!((defaults.low_frequency_boost() - 0.7).abs() < 1e-6);
    }
}
