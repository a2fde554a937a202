use crate::host::{View, Window};

/// Cache keys a buffer is stored and looked up under
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKeys {
    pub file_key: String,
    pub project_key: Option<String>,
}

/// Identity of the surrounding project.
///
/// A scratch buffer carries its own name; otherwise the project descriptor
/// path is used, falling back to the open folders joined with `-`.
pub fn project_identifier(view: &dyn View, window: &dyn Window) -> Option<String> {
    let identifier = if view.is_scratch() && !view.name().is_empty() {
        view.name().to_string()
    } else if let Some(project) = window.project_file_name() {
        project.to_string()
    } else {
        window.folders().join("-")
    };
    (!identifier.is_empty()).then_some(identifier)
}

/// Stylesheets inside a project are stored under both keys; anything else
/// only under its file key unless `return_both` asks for the project key
/// too. Without a project identifier the project key is always `None`.
pub fn keys_of_view(
    view: &dyn View,
    window: &dyn Window,
    css_extensions: &[String],
    return_both: bool,
) -> CacheKeys {
    let file_key = view.key_name().to_string();
    let project = project_identifier(view, window);
    let is_stylesheet = view
        .extension()
        .is_some_and(|ext| css_extensions.iter().any(|e| *e == ext));

    let project_key = if is_stylesheet || return_both {
        project
    } else {
        None
    };
    CacheKeys {
        file_key,
        project_key,
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use rstest::rstest;

    use super::*;
    use crate::host::{Document, WindowState};
    use crate::model::Dialect;

    fn extensions() -> Vec<String> {
        vec![".css".to_string(), ".less".to_string(), ".scss".to_string()]
    }

    fn folders_window() -> WindowState {
        WindowState::new(None, vec!["/work/site".into(), "/work/lib".into()], Vec::new())
    }

    #[test]
    fn test_stylesheet_in_folders_gets_both_keys() {
        let view = Document::from_path(Path::new("/work/site/a.css"), "");
        let keys = keys_of_view(&view, &folders_window(), &extensions(), false);
        assert_eq!(keys.file_key, "/work/site/a.css");
        assert_eq!(keys.project_key.as_deref(), Some("/work/site-/work/lib"));
    }

    #[test]
    fn test_project_file_wins_over_folders() {
        let window = WindowState::new(
            Some("/work/site.sublime-project".into()),
            vec!["/work/site".into()],
            Vec::new(),
        );
        let view = Document::from_path(Path::new("/work/site/a.less"), "");
        let keys = keys_of_view(&view, &window, &extensions(), false);
        assert_eq!(keys.project_key.as_deref(), Some("/work/site.sublime-project"));
    }

    #[rstest]
    #[case(false, None)]
    #[case(true, Some("/work/site-/work/lib"))]
    fn test_markup_uses_project_key_only_on_request(
        #[case] return_both: bool,
        #[case] expected: Option<&str>,
    ) {
        let view = Document::from_path(Path::new("/work/site/index.html"), "");
        let keys = keys_of_view(&view, &folders_window(), &extensions(), return_both);
        assert_eq!(keys.file_key, "/work/site/index.html");
        assert_eq!(keys.project_key.as_deref(), expected);
    }

    #[test]
    fn test_return_both_without_project_yields_file_key_only() {
        let view = Document::from_path(Path::new("/tmp/index.html"), "");
        let keys = keys_of_view(&view, &WindowState::default(), &extensions(), true);
        assert_eq!(
            keys,
            CacheKeys {
                file_key: "/tmp/index.html".into(),
                project_key: None
            }
        );
    }

    #[test]
    fn test_scratch_buffer_uses_its_name() {
        let view = Document::scratch("/ext/base.css".into(), Dialect::Css, "", true);
        let keys = keys_of_view(&view, &folders_window(), &extensions(), false);
        assert_eq!(keys.file_key, "/ext/base.css");
        assert_eq!(keys.project_key.as_deref(), Some("/ext/base.css"));
    }

    #[test]
    fn test_non_scratch_panel_uses_project() {
        let view = Document::scratch("/ext/base.css".into(), Dialect::Css, "", false);
        let keys = keys_of_view(&view, &folders_window(), &extensions(), false);
        assert_eq!(keys.project_key.as_deref(), Some("/work/site-/work/lib"));
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let view = Document::from_path(Path::new("/work/site/a.scss"), "$a: 1;");
        let window = folders_window();
        let first = keys_of_view(&view, &window, &extensions(), true);
        let second = keys_of_view(&view, &window, &extensions(), true);
        assert_eq!(first, second);
    }
}
