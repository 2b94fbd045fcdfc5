//! User metadata attached to source objects.

/// Optional annotations read from the source object's user metadata. They
/// never influence resize behavior; they only enrich the outbound
/// notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub brand_id: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub requested_by: Option<String>,
    pub existing_file: Option<String>,
}

impl ObjectMetadata {
    /// A non-empty `existing_file` marker means the upload replaced a
    /// previously stored object.
    pub fn is_replacement(&self) -> bool {
        self.existing_file
            .as_deref()
            .is_some_and(|v| !v.is_empty())
    }
}
