/// One figure to animate: the output name, the source image next to the
/// program and the text prompt describing the motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Figure {
    pub name: &'static str,
    pub image: &'static str,
    pub prompt: &'static str,
}

pub const FIGURES: &[Figure] = &[
    Figure {
        name: "pendulum",
        image: "classical-energy.png",
        prompt: "pendulum swinging back and forth smoothly",
    },
    Figure {
        name: "cosmic-budget",
        image: "cosmic-budget.png",
        prompt: "cosmic energy visualization with subtle particle movement",
    },
    Figure {
        name: "mitochondria",
        image: "mitochondria.png",
        prompt: "mitochondrial ATP synthesis with gentle motion",
    },
];

impl Figure {
    pub fn output_file_name(&self) -> String {
        format!("{}.mp4", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn figure_names_are_unique() {
        for (i, a) in FIGURES.iter().enumerate() {
            for b in &FIGURES[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn output_file_is_named_after_figure() {
        assert_eq!(FIGURES[0].output_file_name(), "pendulum.mp4");
        assert_eq!(FIGURES[1].output_file_name(), "cosmic-budget.mp4");
    }
}
