use comrak::options::Options;

pub(crate) fn default_options() -> Options<'static> {
    let mut options = Options::default();
    configure_extensions(&mut options);
    options
}

fn configure_extensions(options: &mut Options<'static>) {
    let ext = &mut options.extension;
    ext.strikethrough = true;
    ext.table = true;
    ext.autolink = true;
    ext.tasklist = true;
    ext.tagfilter = false;
    ext.footnotes = false;
    ext.front_matter_delimiter = None;

    let parse = &mut options.parse;
    parse.smart = false;
}

#[cfg(test)]
mod tests {
    use super::default_options;

    #[test]
    fn enables_chat_relevant_extensions() {
        let options = default_options();
        assert!(options.extension.strikethrough);
        assert!(options.extension.table);
        assert!(options.extension.tasklist);
        assert!(options.extension.autolink);
        assert!(!options.extension.footnotes);
    }
}
