use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

const PAYLOAD_SLOT_PLACEHOLDER: &str = "$";

#[derive(Clone, Debug)]
pub struct CallSite;
#[derive(Clone, Debug)]
pub struct Complete;

/// GLSL source fragment. `CallSite` carries the call instruction with a `$`
/// placeholder for the payload location index; `Complete` is a full
/// translation unit ready for compilation.
#[derive(Clone, Debug)]
pub struct ShaderCode<Kind = Complete> {
    value: String,

    kind: PhantomData<Kind>,
}

impl<Kind> Hash for ShaderCode<Kind> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<Kind> PartialEq for ShaderCode<Kind> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<Kind> Eq for ShaderCode<Kind> {}

impl<Kind> From<ShaderCode<Kind>> for String {
    fn from(code: ShaderCode<Kind>) -> Self {
        code.value
    }
}

impl<Kind> Display for ShaderCode<Kind> {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.value)
    }
}

impl ShaderCode<Complete> {
    #[must_use]
    pub fn new(value: String) -> Self {
        assert!(!value.contains(PAYLOAD_SLOT_PLACEHOLDER), "unsubstituted call site left in shader source");
        Self { value, kind: PhantomData }
    }
}

impl ShaderCode<CallSite> {
    #[must_use]
    pub fn new(value: String) -> Self {
        Self { value, kind: PhantomData }
    }

    /// Instantiates the call instruction for the payload variable at the
    /// given location index. Instructions without a placeholder (report
    /// intersection) are returned as is, whatever the index.
    #[must_use]
    pub(crate) fn at_payload_slot(&self, index: u32) -> String {
        self.value.replace(PAYLOAD_SLOT_PLACEHOLDER, &index.to_string())
    }
}

impl<Kind> ShaderCode<Kind> {
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.value.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_site_substitution() {
        let system_under_test = ShaderCode::<CallSite>::new("executeCallableEXT(0, $)".to_string());

        assert_eq!(system_under_test.at_payload_slot(0), "executeCallableEXT(0, 0)");
        assert_eq!(system_under_test.at_payload_slot(3), "executeCallableEXT(0, 3)");
    }

    #[test]
    fn test_call_site_without_placeholder_is_kept_verbatim() {
        let system_under_test = ShaderCode::<CallSite>::new("reportIntersectionEXT(1.0f, 0u)".to_string());

        assert_eq!(system_under_test.at_payload_slot(2), "reportIntersectionEXT(1.0f, 0u)");
    }

    #[test]
    fn test_complete_source_round_trip() {
        let source = "void main() {}\n";
        let system_under_test = ShaderCode::<Complete>::new(source.to_string());

        assert_eq!(system_under_test.as_str(), source);
        assert_eq!(String::from(system_under_test), source);
    }

    #[test]
    #[should_panic(expected = "unsubstituted call site")]
    fn test_complete_source_rejects_leftover_placeholder() {
        let _system_under_test = ShaderCode::<Complete>::new("executeCallableEXT(0, $);".to_string());
    }
}
