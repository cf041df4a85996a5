//! HTML rendering for the users pages.

use std::fmt::Write;

use crate::users::store::User;

/// Escape text for interpolation into HTML content or attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

pub fn list(users: &[User]) -> String {
    let mut html = String::from(
        "<h1>Lista de Usuários</h1>\
         <a href=\"/usuarios/novo\">Novo Usuário</a><br><br>\
         <table border=\"1\" style=\"border-collapse: collapse; width: 60%;\">\
         <tr><th style=\"padding: 8px;\">ID</th><th style=\"padding: 8px;\">Nome</th>\
         <th style=\"padding: 8px;\">Ações</th></tr>",
    );
    for user in users {
        // Writing to a String cannot fail.
        let _ = write!(
            html,
            "<tr>\
             <td style=\"padding: 8px;\">{id}</td>\
             <td style=\"padding: 8px;\">{name}</td>\
             <td style=\"padding: 8px;\">\
             <a href=\"/usuarios/{id}\">Detalhar</a> | \
             <a href=\"/usuarios/{id}/editar\">Editar</a> | \
             <form method=\"POST\" action=\"/usuarios/{id}/excluir\" style=\"display:inline;\">\
             <button type=\"submit\">Excluir</button>\
             </form>\
             </td>\
             </tr>",
            id = user.id,
            name = escape(&user.name),
        );
    }
    html.push_str("</table>");
    html
}

pub fn new_form() -> String {
    "<h1>Novo Usuário</h1>\n\
     <form method=\"POST\" action=\"/usuarios\">\n\
     <label for=\"nome\">Nome:</label><br>\n\
     <input type=\"text\" id=\"nome\" name=\"nome\" required size=\"30\"><br><br>\n\
     <label for=\"email\">Email:</label><br>\n\
     <input type=\"email\" id=\"email\" name=\"email\" required size=\"30\"><br><br>\n\
     <label for=\"telefone\">Telefone:</label><br>\n\
     <input type=\"text\" id=\"telefone\" name=\"telefone\" size=\"30\"><br><br>\n\
     <button type=\"submit\">Salvar</button>\n\
     </form>\n\
     <a href=\"/usuarios\">Voltar para a lista</a>\n"
        .to_string()
}

pub fn detail(user: &User) -> String {
    format!(
        "<h1>Detalhes de {name}</h1>\
         <p><strong>ID:</strong> {id}</p>\
         <p><strong>Email:</strong> {email}</p>\
         <p><strong>Telefone:</strong> {phone}</p>\
         <br><a href=\"/usuarios\">Voltar para a lista</a> | \
         <a href=\"/usuarios/{id}/editar\">Editar</a>",
        id = user.id,
        name = escape(&user.name),
        email = escape(&user.email),
        phone = escape(&user.phone),
    )
}

pub fn edit_form(user: &User) -> String {
    format!(
        "<h1>Editar Usuário: {name}</h1>\n\
         <form method=\"POST\" action=\"/usuarios/{id}/atualizar\">\n\
         <label for=\"nome\">Nome:</label><br>\n\
         <input type=\"text\" id=\"nome\" name=\"nome\" value=\"{name}\" required size=\"30\"><br><br>\n\
         <label for=\"email\">Email:</label><br>\n\
         <input type=\"email\" id=\"email\" name=\"email\" value=\"{email}\" required size=\"30\"><br><br>\n\
         <label for=\"telefone\">Telefone:</label><br>\n\
         <input type=\"text\" id=\"telefone\" name=\"telefone\" value=\"{phone}\" size=\"30\"><br><br>\n\
         <button type=\"submit\">Atualizar</button>\n\
         </form>\n\
         <a href=\"/usuarios\">Cancelar</a>\n",
        id = user.id,
        name = escape(&user.name),
        email = escape(&user.email),
        phone = escape(&user.phone),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ana() -> User {
        User {
            id: 7,
            name: "Ana <b>".to_string(),
            email: "a@b.com".to_string(),
            phone: "123".to_string(),
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn list_links_each_user() {
        let html = list(&[ana()]);
        assert!(html.contains("href=\"/usuarios/7\""));
        assert!(html.contains("action=\"/usuarios/7/excluir\""));
        assert!(html.contains("Ana &lt;b&gt;"));
        assert!(html.ends_with("</table>"));
    }

    #[test]
    fn edit_form_is_prefilled() {
        let html = edit_form(&ana());
        assert!(html.contains("action=\"/usuarios/7/atualizar\""));
        assert!(html.contains("value=\"a@b.com\""));
    }

    #[test]
    fn detail_shows_fields() {
        let html = detail(&ana());
        assert!(html.contains("<p><strong>Telefone:</strong> 123</p>"));
    }
}
