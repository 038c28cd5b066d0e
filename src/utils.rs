//! Some utility functions

use minidom::Element;

/// Walks an XML tree and returns every element that has the given name
pub fn find_elems<S: AsRef<str>>(root: &Element, searched_name: S) -> Vec<&Element> {
    let searched_name = searched_name.as_ref();
    let mut elems: Vec<&Element> = Vec::new();

    for el in root.children() {
        if el.name() == searched_name {
            elems.push(el);
        } else {
            let ret = find_elems(el, searched_name);
            elems.extend(ret);
        }
    }
    elems
}

/// Walks an XML tree until it finds an elements with the given name
pub fn find_elem<S: AsRef<str>>(root: &Element, searched_name: S) -> Option<&Element> {
    let searched_name = searched_name.as_ref();
    if root.name() == searched_name {
        return Some(root);
    }

    for el in root.children() {
        if el.name() == searched_name {
            return Some(el);
        } else {
            let ret = find_elem(el, searched_name);
            if ret.is_some() {
                return ret;
            }
        }
    }
    None
}

/// Walks an XML tree along a path of element names (e.g. `["current-user-principal", "href"]`), and returns the text of the last one
pub fn find_text_at<S: AsRef<str>>(root: &Element, path: &[S]) -> Option<String> {
    let mut current = root;
    for name in path {
        current = find_elem(current, name)?;
    }
    Some(current.text().trim().to_string())
}


#[cfg(test)]
mod tests {
    use super::*;

    const MULTISTATUS: &str = r#"<d:multistatus xmlns:d="DAV:">
        <d:response>
            <d:href>/principals/john/</d:href>
            <d:propstat>
                <d:prop>
                    <d:current-user-principal><d:href>/principals/users/john/</d:href></d:current-user-principal>
                </d:prop>
            </d:propstat>
        </d:response>
        <d:response>
            <d:href>/other/</d:href>
        </d:response>
    </d:multistatus>"#;

    #[test]
    fn test_find_elems() {
        let root: Element = MULTISTATUS.parse().unwrap();
        assert_eq!(find_elems(&root, "response").len(), 2);
        assert_eq!(find_elems(&root, "href").len(), 3);
    }

    #[test]
    fn test_find_text_at() {
        let root: Element = MULTISTATUS.parse().unwrap();
        assert_eq!(find_text_at(&root, &["current-user-principal", "href"]).unwrap(), "/principals/users/john/");
        assert_eq!(find_text_at(&root, &["href"]).unwrap(), "/principals/john/");
        assert!(find_text_at(&root, &["calendar-home-set", "href"]).is_none());
    }
}
