//! Decide, per workspace member, whether its version must be bumped.

use tracing::{debug, trace};

use crate::error::{EvaluateError, RegistryQueryError};
use crate::registry::Registry;
use crate::types::{self, BumpVerdict, MemberId, Verdict, WorkspaceMember};
use crate::workspace::Workspace;

/// Compares declared member versions against a registry
pub struct Evaluator<'a> {
    registry: &'a dyn Registry,
}

impl<'a> Evaluator<'a> {
    pub fn new(registry: &'a dyn Registry) -> Self {
        Self { registry }
    }

    /// Verdict for every member, sorted by package name
    ///
    /// Any registry failure aborts the whole evaluation; a member is never
    /// reported as satisfied because its query failed.
    pub fn evaluate(
        &self,
        members: &[WorkspaceMember],
    ) -> Result<Vec<BumpVerdict>, RegistryQueryError> {
        let mut verdicts = members
            .iter()
            .map(|member| self.evaluate_one(member))
            .collect::<Result<Vec<_>, _>>()?;
        verdicts.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));
        Ok(verdicts)
    }

    /// Load the manifests of changed members and evaluate the publishable ones
    ///
    /// Members without a manifest or with `publish = false` are skipped.
    pub fn evaluate_changed<'m, I>(
        &self,
        ws: &Workspace,
        ids: I,
    ) -> Result<Vec<BumpVerdict>, EvaluateError>
    where
        I: IntoIterator<Item = &'m MemberId>,
    {
        let mut members = Vec::new();
        for id in ids {
            let Some(member) = ws.load_member(id)? else {
                continue;
            };
            if !member.publish {
                trace!(name = %member.name, "skipping, `publish = false`");
                continue;
            }
            members.push(member);
        }
        Ok(self.evaluate(&members)?)
    }

    // One registry query per member: the full list answers both the latest
    // published version and whether the local version itself is taken.
    fn evaluate_one(&self, member: &WorkspaceMember) -> Result<BumpVerdict, RegistryQueryError> {
        let versions = self.registry.published_versions(&member.name)?;
        let published = types::latest(&versions).cloned();
        let verdict = Verdict::decide(&member.version, published.as_ref());

        debug!(
            name = %member.name,
            local = %member.version,
            published = ?published.as_ref().map(ToString::to_string),
            ?verdict,
            "evaluated member"
        );

        Ok(BumpVerdict {
            name: member.name.clone(),
            path: member.id.to_string(),
            local: member.version.clone(),
            local_published: types::contains_release(&versions, &member.version),
            published,
            verdict,
        })
    }
}
