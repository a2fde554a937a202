/// Scope selector in the `a b - c, d` notation.
///
/// * `,` separates alternatives; the selector matches when any does.
/// * whitespace-separated names within a group are descendant steps.
/// * a standalone `-` starts an excluded group.
/// * every step matches a scope name by dotted prefix: `string` matches
///   `string.quoted.double.html`, `source.css` matches `source.css.embedded.html`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScopeSelector {
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Alternative {
    include: Vec<String>,
    exclude: Vec<Vec<String>>,
}

impl ScopeSelector {
    pub fn parse(selector: &str) -> Self {
        let alternatives = selector
            .split(',')
            .filter_map(|alternative| {
                let mut groups: Vec<Vec<String>> = vec![Vec::new()];
                for token in alternative.split_whitespace() {
                    if token == "-" {
                        groups.push(Vec::new());
                    } else if let Some(group) = groups.last_mut() {
                        group.push(token.to_string());
                    }
                }
                let mut groups = groups.into_iter();
                let include = groups.next().unwrap_or_default();
                let exclude: Vec<Vec<String>> = groups.filter(|g| !g.is_empty()).collect();
                if include.is_empty() && exclude.is_empty() {
                    None
                } else {
                    Some(Alternative { include, exclude })
                }
            })
            .collect();

        Self { alternatives }
    }

    /// Check the selector against a scope stack ordered outermost first
    pub fn matches(&self, scopes: &[&str]) -> bool {
        self.score(scopes) > 0
    }

    /// Specificity of the best matching alternative, 0 when nothing matches
    pub fn score(&self, scopes: &[&str]) -> u32 {
        self.alternatives
            .iter()
            .filter_map(|alternative| alternative.score(scopes))
            .max()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }
}

impl Alternative {
    fn score(&self, scopes: &[&str]) -> Option<u32> {
        let score = match_path(&self.include, scopes)?;
        if self
            .exclude
            .iter()
            .any(|excluded| match_path(excluded, scopes).is_some())
        {
            return None;
        }
        Some(score.max(1))
    }
}

/// Match descendant steps in order against the stack; returns the number of
/// matched name segments.
fn match_path(steps: &[String], scopes: &[&str]) -> Option<u32> {
    let mut remaining = scopes.iter();
    let mut segments = 0u32;
    for step in steps {
        remaining.find(|scope| scope_has_prefix(scope, step))?;
        segments += step.split('.').count() as u32;
    }
    Some(segments)
}

fn scope_has_prefix(scope: &str, prefix: &str) -> bool {
    let mut scope_parts = scope.split('.');
    prefix
        .split('.')
        .all(|part| scope_parts.next() == Some(part))
}
