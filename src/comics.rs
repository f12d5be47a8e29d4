use crate::error::Result;
use crate::models::ComicSpec;

/// The known-comics table: name, start URL, next-page selector, image
/// selector. Selectors use the crate's `css@attr` expression form.
pub const SUPPORTED_COMICS: &[(&str, &str, &str, &str)] = &[
    (
        "xkcd",
        "https://xkcd.com/1/",
        r#"a[rel="next"]@href"#,
        "div#comic img@src",
    ),
    (
        "Nedroid",
        "http://nedroid.com/2005/09/2210-whee/",
        "div.nav-next a@href",
        "div#comic img@src",
    ),
    (
        "JL8",
        "http://limbero.org/jl8/1",
        "b:nth-of-type(2) a@href",
        "img@src",
    ),
    (
        "SMBC",
        "https://www.smbc-comics.com/comic/2002-09-05",
        "a.next@href",
        "img#cc-comic@src",
    ),
    (
        "Blindsprings",
        "http://www.blindsprings.com/comic/blindsprings-cover-book-one",
        "a.next@href",
        "img#cc-comic@src",
    ),
    (
        "GuildedAge",
        "https://guildedage.net/comic/chapter-1-cover/",
        "a.comic-nav-next@href",
        "div#comic img@src",
    ),
    (
        "AmazingSuperPowers",
        "https://www.amazingsuperpowers.com/2007/09/heredity/",
        "a.navi-next@href",
        "div.comicpane img@src",
    ),
    (
        "Gunshow",
        "http://gunshowcomic.com/1",
        "span.snavb:nth-of-type(4) a@href",
        "img.strip@src",
    ),
];

/// Looks a comic up by name, case-insensitively.
pub fn find(name: &str) -> Result<Option<ComicSpec>> {
    for (comic_name, start_url, next_page, image) in SUPPORTED_COMICS {
        if comic_name.eq_ignore_ascii_case(name) {
            return Ok(Some(ComicSpec::new(*comic_name, start_url, *next_page, *image)?));
        }
    }
    Ok(None)
}

/// All known comic names, sorted.
pub fn names() -> Vec<&'static str> {
    let mut names: Vec<&str> = SUPPORTED_COMICS.iter().map(|(name, ..)| *name).collect();
    names.sort_unstable();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::CompiledSelector;
    use url::Url;

    #[test]
    fn every_entry_is_well_formed() {
        for (name, start_url, next_page, image) in SUPPORTED_COMICS {
            Url::parse(start_url).unwrap_or_else(|e| panic!("{name}: bad url: {e}"));
            CompiledSelector::parse(next_page)
                .unwrap_or_else(|e| panic!("{name}: bad next selector: {e}"));
            CompiledSelector::parse(image)
                .unwrap_or_else(|e| panic!("{name}: bad image selector: {e}"));
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert!(find("XKCD").unwrap().is_some());
        assert!(find("smbc").unwrap().is_some());
        assert!(find("not-a-comic").unwrap().is_none());
    }

    #[test]
    fn names_are_sorted() {
        let names = names();
        assert_eq!(names.len(), SUPPORTED_COMICS.len());
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }
}
