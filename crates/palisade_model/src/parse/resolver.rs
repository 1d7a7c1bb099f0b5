//! The reference resolution pass.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::objects::ObjectHandle;

use super::ParseSession;

impl ParseSession<'_> {
    /// Walks every object this session knows and binds pending references
    /// whose identifier now matches a built-in, a cached uid or a parsed
    /// name. References whose target never appeared stay pending.
    ///
    /// Objects are marked visited before their references are descended
    /// into, so reference cycles terminate.
    pub(super) fn resolve_references(&mut self) {
        let mut by_name: HashMap<String, ObjectHandle> = HashMap::new();
        for handle in self.cache.values() {
            if let Some(name) = handle.name() {
                by_name.entry(name).or_insert_with(|| handle.clone());
            }
        }

        let mut visited: HashSet<usize> = HashSet::new();
        let mut work: Vec<ObjectHandle> = Vec::new();
        for handle in self.cache.values().chain(self.roots.iter()) {
            if visited.insert(handle.ptr_key()) {
                work.push(handle.clone());
            }
        }

        let mut bound = 0usize;
        while let Some(handle) = work.pop() {
            let mut outgoing = Vec::new();
            handle
                .borrow()
                .visit_references(&mut |reference| outgoing.push(reference.clone()));

            for reference in outgoing {
                if let Some(target) = reference.target() {
                    if visited.insert(target.ptr_key()) {
                        work.push(target);
                    }
                    continue;
                }
                let Some(identifier) = reference.pending_identifier() else {
                    continue;
                };
                let target = self
                    .well_known
                    .get(&identifier)
                    .or_else(|| self.cache.get(&identifier))
                    .or_else(|| by_name.get(&identifier))
                    .cloned();
                match target {
                    Some(target) => {
                        reference.bind(target.clone());
                        bound += 1;
                        trace!(identifier = %identifier, "bound pending reference");
                        if visited.insert(target.ptr_key()) {
                            work.push(target);
                        }
                    }
                    None => {
                        trace!(identifier = %identifier, "reference left pending");
                    }
                }
            }
        }

        self.stats.references_bound = bound;
        self.stats.left_pending = self
            .pending
            .values()
            .filter(|cell| !cell.is_resolved())
            .count();
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::detail::DetailLevel;
    use crate::parse::{parse_objects, ParseSession};
    use crate::well_known::WellKnownRegistry;

    #[test]
    fn forward_references_bind_once_the_target_appears() {
        let wk = WellKnownRegistry::standard();
        // The rule arrives before the objects its columns point at.
        let rows = [
            json!({
                "uid": "r1", "type": "access-rule", "name": "allow-web",
                "source": ["h-web"], "destination": ["dmz-net"],
            }),
            json!({ "uid": "h-web", "type": "host", "name": "web-srv" }),
            json!({ "uid": "n1", "type": "network", "name": "dmz-net" }),
        ];
        let handles = parse_objects(&wk, DetailLevel::Standard, &rows).unwrap();
        let rule = handles[0].access_rule().unwrap();

        // "h-web" matched a uid, "dmz-net" matched a name.
        let source = rule.source().unwrap().get(0).unwrap().target().unwrap();
        assert!(source.same_object(&handles[1]));
        let destination = rule.destination().unwrap().get(0).unwrap().target().unwrap();
        assert!(destination.same_object(&handles[2]));
    }

    #[test]
    fn shared_cells_rebind_for_every_holder() {
        let wk = WellKnownRegistry::standard();
        let rows = [
            json!({
                "uid": "r1", "type": "access-rule", "name": "a",
                "source": ["web-srv"], "destination": ["web-srv"],
            }),
            json!({ "uid": "h1", "type": "host", "name": "web-srv" }),
        ];
        let handles = parse_objects(&wk, DetailLevel::Standard, &rows).unwrap();
        let rule = handles[0].access_rule().unwrap();
        let source = rule.source().unwrap().get(0).unwrap().clone();
        let destination = rule.destination().unwrap().get(0).unwrap().clone();
        assert!(source.shares_cell(&destination));
        assert!(source.target().unwrap().same_object(&handles[1]));
    }

    #[test]
    fn unmatched_identifiers_stay_pending() {
        let wk = WellKnownRegistry::standard();
        let mut session = ParseSession::new(&wk, DetailLevel::Full);
        let group = session
            .root(&json!({
                "uid": "g1", "type": "group", "name": "dmz",
                "members": ["nowhere-to-be-found"],
            }))
            .unwrap();
        let stats = session.finish();

        assert_eq!(stats.left_pending, 1);
        let payload = group.group().unwrap();
        let member = payload.members().unwrap().get(0).unwrap().clone();
        assert!(!member.is_resolved());
        assert_eq!(
            member.pending_identifier().as_deref(),
            Some("nowhere-to-be-found")
        );
    }

    #[test]
    fn resolution_counts_bound_references() {
        let wk = WellKnownRegistry::standard();
        let mut session = ParseSession::new(&wk, DetailLevel::Full);
        session
            .root(&json!({
                "uid": "g1", "type": "group", "name": "dmz",
                "members": ["h1", "ghost"],
            }))
            .unwrap();
        session
            .root(&json!({ "uid": "h1", "type": "host", "name": "web-srv" }))
            .unwrap();
        let stats = session.finish();
        assert_eq!(stats.references_bound, 1);
        assert_eq!(stats.left_pending, 1);
    }
}
