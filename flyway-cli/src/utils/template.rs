/// Expand `${NAME}` placeholders with values from `lookup`.
///
/// Unset variables expand to an empty string, `$$` is a literal `$`, and a
/// `$` that starts neither form is kept as-is.
pub fn expand_env_vars<F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        match chars.peek() {
            Some('$') => {
                result.push('$');
                chars.next();
            }
            Some('{') => {
                chars.next();
                let mut name = String::new();
                let mut closed = false;
                for n in chars.by_ref() {
                    if n == '}' {
                        closed = true;
                        break;
                    }
                    name.push(n);
                }

                if closed {
                    result.push_str(&lookup(&name).unwrap_or_default());
                } else {
                    // Unterminated placeholder, keep the text
                    result.push_str("${");
                    result.push_str(&name);
                }
            }
            _ => result.push('$'),
        }
    }

    result
}
