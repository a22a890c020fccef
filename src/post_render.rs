use std::io;
use std::io::ErrorKind;

use markdown::Options;

use crate::code_fence;
use crate::post::Post;

fn strip_comments(md_post: &str) -> io::Result<String> {
    let mut res: String = String::new();
    let mut slice = Some(md_post);

    let start_comment = "<!--";
    let end_comment = "-->";

    while let Some(block) = slice {
        let md_buf: &str = match block.find(start_comment) {
            Some(start) => {
                let to_render: &str = &block[0..start];

                let next: &str = &block[(start + start_comment.len())..];
                match next.find(end_comment) {
                    Some(end) => {
                        slice = Some(&next[(end + end_comment.len())..]);
                    }
                    None => {
                        return Err(io::Error::new(
                            ErrorKind::InvalidData,
                            "Error finding end of comment",
                        ))
                    }
                };

                to_render
            }
            None => {
                slice = None;
                block
            }
        };
        res.push_str(md_buf);
    }

    Ok(res)
}

/// Removes HTML comments from the Markdown text. Fenced code blocks are kept as written.
pub fn remove_comments(md_post: &str) -> io::Result<String> {
    let fences = code_fence::scan(md_post);
    let mut res = String::new();
    let mut prose = String::new();

    for (idx, line) in md_post.split_inclusive('\n').enumerate() {
        if fences.iter().any(|fence| fence.contains(idx + 1)) {
            res.push_str(&strip_comments(&prose)?);
            prose.clear();
            res.push_str(line);
        } else {
            prose.push_str(line);
        }
    }
    res.push_str(&strip_comments(&prose)?);

    Ok(res)
}

pub fn render_markdown(md_text: &str) -> io::Result<String> {
    let buf = remove_comments(md_text)?;
    match markdown::to_html_with_options(buf.as_str(), &Options::gfm()) {
        Ok(x) => Ok(x),
        Err(e) => Err(io::Error::new(ErrorKind::InvalidInput, e.reason.as_str())),
    }
}

/// Renders what the site generator shows in post lists: the text before `<!--more-->`,
/// or the whole body when the post has no marker.
pub fn render_summary(post: &Post) -> io::Result<String> {
    let summary = post.summary().unwrap_or(&post.body);
    render_markdown(summary.trim())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::test_data::POST_DATA_YAML;

    use super::*;

    #[test]
    fn test_remove_comments() {
        let res = remove_comments("Some text.<!-- more -->Wo<!-- xyz -->rd").unwrap();
        assert_eq!(res, "Some text.Word");

        let res = remove_comments("Some text.Word").unwrap();
        assert_eq!(res, "Some text.Word");

        let res = remove_comments("").unwrap();
        assert_eq!(res, "");

        let res = remove_comments("<!-- more --><!-- xyz -->").unwrap();
        assert_eq!(res, "");

        assert!(remove_comments("text <!-- never closed").is_err());
    }

    #[test]
    fn test_remove_comments_keeps_code() {
        let md = "Intro<!-- draft -->\n\n```html\n<!-- keep me -->\n<!-- open\n```\n\nEnd<!-- x -->\n";
        let res = remove_comments(md).unwrap();
        assert_eq!(res, "Intro\n\n```html\n<!-- keep me -->\n<!-- open\n```\n\nEnd\n");
    }

    #[test]
    fn test_render_comments_in_code() {
        let raw = "---\ntitle: x\n---\nUnclosed comment in a sample:\n\n```html\n<!-- open\n```\n";
        let post = Post::from_string(Path::new("open.md"), raw).unwrap();
        let html = render_summary(&post).unwrap();
        assert!(html.contains("&lt;!-- open"));

        let raw = "---\ntitle: x\n---\n```html\n<!-- keep me -->\n<p>a</p>\n```\n";
        let post = Post::from_string(Path::new("keep.md"), raw).unwrap();
        let html = render_summary(&post).unwrap();
        assert!(html.contains("&lt;!-- keep me --&gt;"));
        assert!(html.contains("&lt;p&gt;a&lt;/p&gt;"));
    }

    #[test]
    fn test_render_summary() {
        let post = Post::from_string(Path::new("kubernetes-backup-dr.md"), POST_DATA_YAML).unwrap();
        let html = render_summary(&post).unwrap();
        assert!(html.starts_with("<p>Backing up a cluster is more than copying etcd.</p>"));
        assert!(html.contains("<p>This post walks through <em>Velero</em>, etcd snapshots and volume snapshots.</p>"));
        assert!(!html.contains("Installing Velero"));
    }

    #[test]
    fn test_render_without_marker() {
        let raw = "---\ntitle: x\n---\n# Heading\n\n```sh\nlvs\n```\n";
        let post = Post::from_string(Path::new("lvm.md"), raw).unwrap();
        let html = render_summary(&post).unwrap();
        assert!(html.starts_with("<h1>Heading</h1>"));
        assert!(html.contains(r#"<code class="language-sh">lvs"#));
    }
}
