use crate::{
    recommend::{ArtistMatch, Catalog},
    types::Track,
};

/// Artists worth offering alongside a primary artist when building a playlist.
const ASSOCIATED_ARTISTS: &[(&str, &[&str])] = &[
    (
        "Radiohead",
        &["Thom Yorke", "Atoms for Peace", "The Smile", "Jonny Greenwood"],
    ),
    ("Daft Punk", &["Thomas Bangalter", "Justice", "Cassius", "Kavinsky"]),
    ("Kendrick Lamar", &["SZA", "Schoolboy Q", "Ab-Soul", "Jay Rock"]),
    ("Tame Impala", &["Pond", "MGMT", "Melody's Echo Chamber"]),
    (
        "Fleetwood Mac",
        &["Stevie Nicks", "Lindsey Buckingham", "Christine McVie"],
    ),
    ("Bon Iver", &["Big Red Machine", "Volcano Choir", "The National"]),
    ("Fred again..", &["Four Tet", "Skrillex", "Romy", "Jamie xx"]),
];

/// Associated artists for `primary`, matched case-insensitively.
pub fn suggest(primary: &str) -> &'static [&'static str] {
    ASSOCIATED_ARTISTS
        .iter()
        .find(|(artist, _)| artist.eq_ignore_ascii_case(primary.trim()))
        .map(|(_, associated)| *associated)
        .unwrap_or(&[])
}

/// Associated artists for `primary` that have at least one song in `catalog`.
pub fn suggest_in(primary: &str, catalog: &Catalog, matcher: ArtistMatch) -> Vec<String> {
    suggest(primary)
        .iter()
        .map(|artist| artist.to_string())
        .filter(|artist| {
            let wanted = std::slice::from_ref(artist);
            catalog
                .rows()
                .iter()
                .any(|row| matcher.matches(&row.artists, wanted))
        })
        .collect()
}

/// The artists a playlist is filtered on.
///
/// An explicit selection is used as is, plus the primary artist. Without one,
/// every artist credited on the reference track is used.
pub fn artist_set(reference: &Track, selection: Option<&[String]>) -> Vec<String> {
    let selection: Vec<String> = selection
        .unwrap_or_default()
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if selection.is_empty() {
        return reference.artist_names();
    }

    let mut artists: Vec<String> = reference
        .primary_artist()
        .map(str::to_string)
        .into_iter()
        .collect();
    for artist in selection {
        if !artists.contains(&artist) {
            artists.push(artist);
        }
    }
    artists
}
