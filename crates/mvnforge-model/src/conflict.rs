use mvnforge_coord::Project;

/// A case where two or more declared versions of the same project were
/// encountered during enumeration; `chosen_version` is the one nearest-wins
/// selected, `losing_versions` records what was passed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConflict {
    pub project: Project,
    pub chosen_version: String,
    pub chosen_depth: usize,
    pub losing_versions: Vec<(String, usize)>,
}

#[derive(Debug, Clone, Default)]
pub struct ConflictReport {
    pub conflicts: Vec<VersionConflict>,
}

impl ConflictReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Records a losing version for `project`, creating the conflict entry
    /// on first occurrence.
    pub fn record_loss(
        &mut self,
        project: &Project,
        chosen_version: &str,
        chosen_depth: usize,
        losing_version: &str,
        losing_depth: usize,
    ) {
        if let Some(existing) = self
            .conflicts
            .iter_mut()
            .find(|c| &c.project == project)
        {
            existing
                .losing_versions
                .push((losing_version.to_string(), losing_depth));
            return;
        }
        self.conflicts.push(VersionConflict {
            project: project.clone(),
            chosen_version: chosen_version.to_string(),
            chosen_depth,
            losing_versions: vec![(losing_version.to_string(), losing_depth)],
        });
    }
}
