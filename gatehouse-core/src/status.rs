// HTTP status codes

/// Statuses the gateway answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum HttpStatus {
    Ok = 200,
    /// Redirect to a provider's consent page.
    Found = 302,
    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    MethodNotAllowed = 405,
    InternalServerError = 500,
    /// The provider answered with something unusable, or not at all.
    BadGateway = 502,
    ServiceUnavailable = 503,
}

const ALL: [HttpStatus; 10] = [
    HttpStatus::Ok,
    HttpStatus::Found,
    HttpStatus::BadRequest,
    HttpStatus::Unauthorized,
    HttpStatus::Forbidden,
    HttpStatus::NotFound,
    HttpStatus::MethodNotAllowed,
    HttpStatus::InternalServerError,
    HttpStatus::BadGateway,
    HttpStatus::ServiceUnavailable,
];

impl HttpStatus {
    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn reason(self) -> &'static str {
        match self {
            HttpStatus::Ok => "OK",
            HttpStatus::Found => "Found",
            HttpStatus::BadRequest => "Bad Request",
            HttpStatus::Unauthorized => "Unauthorized",
            HttpStatus::Forbidden => "Forbidden",
            HttpStatus::NotFound => "Not Found",
            HttpStatus::MethodNotAllowed => "Method Not Allowed",
            HttpStatus::InternalServerError => "Internal Server Error",
            HttpStatus::BadGateway => "Bad Gateway",
            HttpStatus::ServiceUnavailable => "Service Unavailable",
        }
    }

    pub fn is_client_error(self) -> bool {
        (400..500).contains(&self.code())
    }

    pub fn is_server_error(self) -> bool {
        self.code() >= 500
    }

    pub fn from_code(code: u16) -> Option<Self> {
        ALL.into_iter().find(|status| status.code() == code)
    }
}

impl std::fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.code(), self.reason())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classes() {
        assert!(!HttpStatus::Found.is_client_error());
        assert!(HttpStatus::Unauthorized.is_client_error());
        assert!(HttpStatus::BadGateway.is_server_error());
        assert!(!HttpStatus::BadRequest.is_server_error());
    }

    #[test]
    fn test_from_code_round_trip() {
        assert_eq!(HttpStatus::from_code(401), Some(HttpStatus::Unauthorized));
        assert_eq!(HttpStatus::from_code(302).map(|s| s.code()), Some(302));
        assert_eq!(HttpStatus::from_code(418), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(HttpStatus::BadRequest.to_string(), "400 Bad Request");
    }
}
