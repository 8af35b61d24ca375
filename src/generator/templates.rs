use askama::Template;

/// One registered handler as the client template sees it.
#[derive(Debug, Clone)]
pub struct HandlerView {
    /// PascalCase(namespace) + PascalCase(name), prefix of the type aliases
    pub prefix: String,
    pub input: String,
    pub output: String,
    pub has_input: bool,
}

/// A client method inside a namespace group.
#[derive(Debug, Clone)]
pub struct MethodView {
    /// Escaped property key for the handler name
    pub property: String,
    pub prefix: String,
    /// `"namespace.name"` as a quoted string literal
    pub path_literal: String,
    pub has_input: bool,
}

/// Handlers sharing a namespace, in first-registered order.
#[derive(Debug, Clone)]
pub struct NamespaceView {
    /// Escaped property key for the namespace
    pub property: String,
    pub methods: Vec<MethodView>,
}

/// The generated TypeScript client.
#[derive(Template)]
#[template(path = "client.ts.txt", escape = "none")]
pub struct ClientTemplate {
    /// Named type definitions, without the `export` prefix
    pub definitions: Vec<String>,
    pub handlers: Vec<HandlerView>,
    pub namespaces: Vec<NamespaceView>,
}
