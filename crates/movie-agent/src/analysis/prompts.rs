//! Prompts for the two analysis passes.

/// System prompt shared by every run.
pub const SYSTEM_PROMPT: &str = "\
You are a movie analysis agent. You answer questions about movies and the actors \
who appear in them.

Always use the search_movie_info tool to find accurate, up-to-date information \
before answering; do not rely on memory alone. Use the calculator tool for any \
arithmetic. If a tool fails, you may retry with a different query.

Answer exactly in the format the user asks for, without extra commentary. If you \
cannot find the information, say so plainly.";

/// First pass: lead characters and their actors, one pair per line.
pub fn cast_prompt(title: &str) -> String {
    format!(
        "Find the lead characters of the movie \"{title}\" and the actors who play them.\n\
         Reply with one line per lead character, in the form:\n\
         Character -> Actor\n\
         List only the main cast and add no other text."
    )
}

/// Second pass: an actor's most recent films, most recent first.
pub fn filmography_prompt(actor: &str, max_films: usize) -> String {
    format!(
        "Find the {max_films} most recent movies featuring the actor {actor}.\n\
         Reply with a bulleted list, one movie title per line, most recent first:\n\
         - Title\n\
         Add no other text."
    )
}
