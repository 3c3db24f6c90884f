/// Redacted, externally safe projection of a value.
///
/// The response envelope calls `public_view` on every payload before
/// serialization, so internal records (password hashes, session tokens,
/// device tokens) never reach the wire. Types that are already public
/// project to themselves.
pub trait PublicView {
    type View: serde::Serialize;

    fn public_view(self) -> Self::View;
}

impl<T: PublicView> PublicView for Vec<T> {
    type View = Vec<T::View>;

    fn public_view(self) -> Self::View {
        self.into_iter().map(PublicView::public_view).collect()
    }
}

impl<T: PublicView> PublicView for Option<T> {
    type View = Option<T::View>;

    fn public_view(self) -> Self::View {
        self.map(PublicView::public_view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Secret {
        name: &'static str,
        #[allow(dead_code)]
        password: &'static str,
    }

    impl PublicView for Secret {
        type View = String;

        fn public_view(self) -> String {
            self.name.to_string()
        }
    }

    #[test]
    fn collections_project_each_element() {
        let rows = vec![
            Secret { name: "a", password: "x" },
            Secret { name: "b", password: "y" },
        ];
        let json = serde_json::to_string(&rows.public_view()).unwrap();
        assert_eq!(json, r#"["a","b"]"#);
        assert!(!json.contains('x'));
    }

    #[test]
    fn missing_option_projects_to_null() {
        let none: Option<Secret> = None;
        assert_eq!(serde_json::to_string(&none.public_view()).unwrap(), "null");
    }
}
