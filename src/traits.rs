use crate::error::AuthError;

/// A closed set of codes that travel on the wire to the policy engine, e.g.
/// resource types (`sys_model`), action ids (`edit`) and scope types (`proj`).
pub trait WireVocabulary: Sized + Copy + 'static {
    /// Name of the vocabulary, used in "not found" errors.
    fn vocabulary() -> &'static str;

    /// Every member of the vocabulary.
    fn members() -> &'static [Self];

    /// The code sent on the wire.
    fn wire_code(&self) -> &'static str;

    /// Human-readable name shown by the policy engine.
    fn display_name(&self) -> &'static str;

    /// Look a code up, returning `UnknownCode` rather than a default when the
    /// code is not part of the vocabulary.
    fn from_wire(code: &str) -> Result<Self, AuthError> {
        Self::members()
            .iter()
            .copied()
            .find(|member| member.wire_code() == code)
            .ok_or_else(|| AuthError::UnknownCode {
                vocabulary: Self::vocabulary().to_string(),
                code: code.to_string(),
            })
    }
}
