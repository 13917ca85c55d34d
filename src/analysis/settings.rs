/// Tuning knobs for an analysis run
#[derive(Clone, Debug)]
pub struct Settings {
    /// Track the contents of arrays created with a constant size
    ///
    /// When disabled, every array value has unknown contents.
    pub track_array_contents: bool,

    /// Largest array whose contents are tracked element by element
    ///
    /// Arrays allocated with a bigger (or non-constant) size are still typed, but loads from
    /// them produce "known type, unknown value" results.
    pub max_tracked_array_length: usize,

    /// Maximum number of instructions the fixpoint loop executes before giving up
    ///
    /// Revisiting an instruction counts again. When the limit is hit, the frames computed so far
    /// are returned and the analysis is reported as not converged. `None` means no limit.
    pub max_steps: Option<usize>,
}

impl Settings {
    pub const DEFAULT_MAX_TRACKED_ARRAY_LENGTH: usize = 256;
    pub const DEFAULT_MAX_STEPS: usize = 100_000;

    /// Should an array of the given length get tracked contents?
    pub fn tracks_array_of_length(&self, length: usize) -> bool {
        self.track_array_contents && length <= self.max_tracked_array_length
    }
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            track_array_contents: true,
            max_tracked_array_length: Self::DEFAULT_MAX_TRACKED_ARRAY_LENGTH,
            max_steps: Some(Self::DEFAULT_MAX_STEPS),
        }
    }
}
