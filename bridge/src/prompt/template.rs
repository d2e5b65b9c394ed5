//! The fixed instruction template

/// Rules embedded verbatim in every prompt
pub const RULES: &str = "\
### RULES ###
1. Return ONLY the raw SQL. No markdown, no code fences, no explanations.
2. Always end every statement with a semicolon (;).
3. CHECK EXISTENCE:
   - If the user asks to create a table that is listed in the schema above, use `CREATE TABLE IF NOT EXISTS`.
   - If the user asks about a table NOT listed above, do not invent it.
4. DESTRUCTIVE ACTIONS:
   - If the user asks to DROP tables or DELETE data, ALWAYS append `CASCADE` (e.g. `DROP TABLE name CASCADE;`) so it succeeds despite foreign keys.
5. Use valid PostgreSQL syntax.";

/// Build the full prompt from rendered DDL and the user's question
pub fn build_prompt(schema_ddl: &str, question: &str) -> String {
    format!(
        "You are a PostgreSQL expert. Convert the user's natural language question into a valid SQL query.\n\
         \n\
         ### LIVE DATABASE SCHEMA ###\n\
         The following tables currently exist in the database. You MUST ONLY use these tables:\n\
         \n\
         {schema_ddl}\n\
         \n\
         {RULES}\n\
         \n\
         User Question: {question}\n\
         SQL:"
    )
}
