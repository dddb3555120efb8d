use crate::bsky::{Bluesky, Embed, ImageEmbed, Record, StrongRef, TextBuilder};
use crate::error::Result;

use super::media::ImageSource;
use super::Candidate;

const AUTHOR_HANDLE: &str = "ImShahinyan";
const IMAGE_ALT: &str = "chess board with a puzzle";

/// Text and facets of a puzzle cross-post:
///
/// ```text
/// mate in 2 puzzle from @ImShahinyan:
/// "<title>"
/// #chess #puzzle
/// ```
pub fn compose(candidate: &Candidate) -> TextBuilder {
    let mut tb = TextBuilder::new();
    tb.text("mate in 2 puzzle from ")
        .link(
            &format!("@{AUTHOR_HANDLE}"),
            &format!("https://x.com/{AUTHOR_HANDLE}/status/{}", candidate.post_id),
        )
        .text(":\n")
        .text("\"")
        .text(&candidate.title)
        .text("\"\n")
        .tag("#chess", "chess")
        .text(" ")
        .tag("#puzzle", "puzzle");
    tb
}

/// Upload the board image and create the post.
pub fn post<B: Bluesky + ?Sized>(
    bsky: &B,
    images: &dyn ImageSource,
    candidate: &Candidate,
) -> Result<StrongRef> {
    let png = images.fetch_png(&candidate.image_id)?;
    let blob = bsky.upload_blob(png, "image/png")?;

    let (text, facets) = compose(candidate).build();
    let embed = Embed::Images {
        images: vec![ImageEmbed {
            alt: IMAGE_ALT.to_string(),
            image: blob,
        }],
    };
    bsky.create_record(&Record::post(text, facets, Some(embed)))
}
